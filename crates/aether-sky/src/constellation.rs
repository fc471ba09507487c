//! Constellation edges between nearby stars.
//!
//! Candidate edges join every pair of non-faint stars closer than the
//! threshold in original (unrotated) space. Edges survive only inside
//! connected components of at least `min_component_size` stars, which
//! prunes isolated pairs.
//!
//! Candidate generation is O(n²). Fine for a few thousand stars; larger
//! fields would need spatial partitioning.

use std::collections::VecDeque;

use aether_config::ConstellationConfig;
use tracing::debug;

use crate::population::Star;

/// An edge between two stars, by index into the star list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint. Always greater than `a`.
    pub b: usize,
    /// Base opacity, `opacity_scale * (1 - distance / threshold)`.
    pub opacity: f32,
}

/// Every non-faint pair closer than `threshold`.
pub fn candidate_edges(stars: &[Star], threshold: f32, opacity_scale: f32) -> Vec<Connection> {
    let mut edges = Vec::new();
    if threshold.is_nan() || threshold <= 0.0 {
        return edges;
    }
    for (a, sa) in stars.iter().enumerate() {
        if sa.faint {
            continue;
        }
        for (offset, sb) in stars[a + 1..].iter().enumerate() {
            if sb.faint {
                continue;
            }
            let distance = sa.origin.distance(sb.origin);
            if distance < threshold {
                edges.push(Connection {
                    a,
                    b: a + 1 + offset,
                    opacity: opacity_scale * (1.0 - distance / threshold),
                });
            }
        }
    }
    edges
}

/// Component id of every node, labelled by breadth-first traversal.
/// Returns the labels and the size of each component.
pub fn components(node_count: usize, edges: &[Connection]) -> (Vec<usize>, Vec<usize>) {
    let mut adjacency = vec![Vec::new(); node_count];
    for edge in edges {
        adjacency[edge.a].push(edge.b);
        adjacency[edge.b].push(edge.a);
    }

    let mut label = vec![usize::MAX; node_count];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();
    for start in 0..node_count {
        if label[start] != usize::MAX {
            continue;
        }
        let id = sizes.len();
        let mut size = 0;
        label[start] = id;
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            size += 1;
            for &next in &adjacency[node] {
                if label[next] == usize::MAX {
                    label[next] = id;
                    queue.push_back(next);
                }
            }
        }
        sizes.push(size);
    }
    (label, sizes)
}

/// Visible constellation edges for `stars` at the given `threshold`.
pub fn link(stars: &[Star], threshold: f32, config: &ConstellationConfig) -> Vec<Connection> {
    let candidates = candidate_edges(stars, threshold, config.opacity_scale);
    let (label, sizes) = components(stars.len(), &candidates);
    let candidate_count = candidates.len();
    let edges: Vec<Connection> = candidates
        .into_iter()
        .filter(|e| sizes[label[e.a]] >= config.min_component_size)
        .collect();
    debug!(
        candidates = candidate_count,
        kept = edges.len(),
        threshold,
        "Linked constellations"
    );
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn star(x: f32, y: f32) -> Star {
        let origin = Vec2::new(x, y);
        Star {
            origin,
            position: origin,
            size: 1.0,
            depth: 0.5,
            color: Vec3::ONE,
            glow: false,
            glow_intensity: 0.0,
            base_opacity: 1.0,
            opacity: 1.0,
            twinkle_speed: 1.0,
            twinkle_phase: 0.0,
            faint: false,
        }
    }

    fn faint(x: f32, y: f32) -> Star {
        Star {
            faint: true,
            ..star(x, y)
        }
    }

    fn config() -> ConstellationConfig {
        ConstellationConfig::default()
    }

    /// Independent union-find used to cross-check component sizes.
    fn union_find_sizes(n: usize, edges: &[Connection]) -> Vec<usize> {
        fn find(parent: &mut [usize], x: usize) -> usize {
            let mut root = x;
            while parent[root] != root {
                root = parent[root];
            }
            let mut node = x;
            while parent[node] != root {
                let next = parent[node];
                parent[node] = root;
                node = next;
            }
            root
        }
        let mut parent: Vec<usize> = (0..n).collect();
        for e in edges {
            let (ra, rb) = (find(&mut parent, e.a), find(&mut parent, e.b));
            if ra != rb {
                parent[ra] = rb;
            }
        }
        let mut counts = vec![0; n];
        for i in 0..n {
            let root = find(&mut parent, i);
            counts[root] += 1;
        }
        (0..n)
            .map(|i| {
                let root = find(&mut parent, i);
                counts[root]
            })
            .collect()
    }

    #[test]
    fn test_isolated_pair_is_pruned() {
        let stars = vec![star(0.0, 0.0), star(30.0, 0.0)];
        assert!(link(&stars, 100.0, &config()).is_empty());
    }

    #[test]
    fn test_triangle_survives() {
        let stars = vec![star(0.0, 0.0), star(30.0, 0.0), star(60.0, 0.0)];
        let edges = link(&stars, 50.0, &config());
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_faint_stars_never_linked() {
        let stars = vec![star(0.0, 0.0), faint(10.0, 0.0), star(20.0, 0.0), faint(30.0, 0.0)];
        let candidates = candidate_edges(&stars, 100.0, 0.2);
        assert_eq!(candidates.len(), 1);
        assert!(link(&stars, 100.0, &config()).is_empty());
    }

    #[test]
    fn test_opacity_falls_with_distance() {
        let stars = vec![star(0.0, 0.0), star(25.0, 0.0), star(75.0, 0.0)];
        let edges = candidate_edges(&stars, 100.0, 0.2);
        let near = edges.iter().find(|e| (e.a, e.b) == (0, 1)).unwrap();
        let far = edges.iter().find(|e| (e.a, e.b) == (0, 2)).unwrap();
        assert!((near.opacity - 0.15).abs() < 1e-6);
        assert!((far.opacity - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_zero_threshold_yields_nothing() {
        let stars = vec![star(0.0, 0.0), star(0.0, 0.0), star(0.0, 0.0)];
        assert!(link(&stars, 0.0, &config()).is_empty());
        assert!(link(&stars, f32::NAN, &config()).is_empty());
    }

    #[test]
    fn test_kept_edges_match_union_find() {
        // Two pairs, one chain of four, and a lone star.
        let stars = vec![
            star(0.0, 0.0),
            star(10.0, 0.0),
            star(500.0, 0.0),
            star(510.0, 0.0),
            star(0.0, 300.0),
            star(10.0, 300.0),
            star(20.0, 300.0),
            star(30.0, 300.0),
            star(900.0, 900.0),
        ];
        let threshold = 15.0;
        let kept = link(&stars, threshold, &config());
        let all = candidate_edges(&stars, threshold, 0.2);
        let sizes = union_find_sizes(stars.len(), &all);
        assert_eq!(kept.len(), 3);
        for edge in &kept {
            assert!(sizes[edge.a] >= 3 && sizes[edge.b] >= 3);
        }
        for edge in all.iter().filter(|e| sizes[e.a] >= 3) {
            assert!(kept.iter().any(|k| (k.a, k.b) == (edge.a, edge.b)));
        }
    }
}
