//! Weighted random category selection.
//!
//! Weights are expected to sum to 1 but this is not enforced: selection walks
//! the cumulative sum and stops at the first entry whose cumulative weight
//! reaches the draw. If rounding leaves the draw unmatched, the first entry
//! wins.

use rand::Rng;

/// Index of the entry selected by `draw` (expected in `[0, 1)`).
///
/// Returns `None` only when `weights` is empty.
pub fn pick_index_with<I>(weights: I, draw: f32) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    let mut cumulative = 0.0;
    let mut any = false;
    for (index, weight) in weights.into_iter().enumerate() {
        any = true;
        cumulative += weight;
        if cumulative >= draw {
            return Some(index);
        }
    }
    any.then_some(0)
}

/// Select an item from `(item, weight)` pairs using a precomputed `draw`.
pub fn pick_with<T>(choices: &[(T, f32)], draw: f32) -> Option<&T> {
    pick_index_with(choices.iter().map(|(_, w)| *w), draw).map(|i| &choices[i].0)
}

/// Select an item from `(item, weight)` pairs with a fresh uniform draw.
pub fn pick<'a, T, R: Rng + ?Sized>(choices: &'a [(T, f32)], rng: &mut R) -> Option<&'a T> {
    pick_with(choices, rng.random::<f32>())
}

/// Select an index given only the weights, with a fresh uniform draw.
pub fn pick_index<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    pick_index_with(weights.iter().copied(), rng.random::<f32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        White,
        Blue,
        Orange,
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let choices = [(Kind::White, 0.7), (Kind::Blue, 0.2), (Kind::Orange, 0.1)];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut counts = [0u32; 3];
        let samples = 100_000;
        for _ in 0..samples {
            match pick(&choices, &mut rng) {
                Some(Kind::White) => counts[0] += 1,
                Some(Kind::Blue) => counts[1] += 1,
                Some(Kind::Orange) => counts[2] += 1,
                None => panic!("non-empty choices must yield a pick"),
            }
        }
        for (count, (_, weight)) in counts.iter().zip(choices.iter()) {
            let freq = *count as f32 / samples as f32;
            assert!(
                (freq - weight).abs() < 0.01,
                "frequency {freq} should be close to weight {weight}"
            );
        }
    }

    #[test]
    fn test_cumulative_short_circuit() {
        let choices = [("a", 0.5), ("b", 0.3), ("c", 0.2)];
        assert_eq!(pick_with(&choices, 0.0), Some(&"a"));
        assert_eq!(pick_with(&choices, 0.5), Some(&"a"));
        assert_eq!(pick_with(&choices, 0.51), Some(&"b"));
        assert_eq!(pick_with(&choices, 0.99), Some(&"c"));
    }

    #[test]
    fn test_unmatched_draw_falls_back_to_first() {
        let choices = [("a", 0.3), ("b", 0.3), ("c", 0.3)];
        assert_eq!(pick_with(&choices, 0.95), Some(&"a"));
    }

    #[test]
    fn test_empty_choices_yield_none() {
        let choices: [(u8, f32); 0] = [];
        assert_eq!(pick_with(&choices, 0.5), None);
        assert_eq!(pick_index_with(std::iter::empty(), 0.5), None);
    }
}
