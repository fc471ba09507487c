//! Host input events and interactive-target classification.
//!
//! The host page forwards pointer and touch input together with a short
//! description of the element under the pointer. Effects are never spawned
//! when that element is something the user meant to interact with.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tags that always count as interactive.
const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "label", "summary", "option",
];

/// ARIA roles that count as interactive.
const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "switch", "tab", "menuitem", "option", "slider",
];

/// Description of the element struck by a pointer event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Lowercase tag name.
    pub tag: String,
    /// ARIA role, if any.
    pub role: Option<String>,
    /// Whether the element carries an accessible label (`aria-label` and friends).
    pub has_label: bool,
    /// Whether an ancestor is itself interactive.
    pub inside_interactive: bool,
}

impl ElementInfo {
    /// Element with only a tag name.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }
}

/// Whether pointer input on `element` belongs to the page, not the sky.
///
/// Links, buttons, form controls, interactive roles, and labeled controls
/// qualify, as does anything nested inside one of them.
pub fn is_interactive(element: &ElementInfo) -> bool {
    if element.inside_interactive || element.has_label {
        return true;
    }
    if INTERACTIVE_TAGS.contains(&element.tag.as_str()) {
        return true;
    }
    element
        .role
        .as_deref()
        .is_some_and(|role| INTERACTIVE_ROLES.contains(&role))
}

/// One input event, in viewport pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary pointer click or tap.
    PointerDown {
        /// Screen position.
        position: Vec2,
        /// Element under the pointer, `None` for bare background.
        target: Option<ElementInfo>,
    },
    /// Pointer or touch movement.
    PointerMove {
        /// Screen position.
        position: Vec2,
    },
    /// Touch drag that ended without a click (touch-drag-cancel).
    Swipe {
        /// Where the drag started.
        from: Vec2,
        /// Where the drag ended.
        to: Vec2,
        /// Element under the drag start.
        target: Option<ElementInfo>,
    },
    /// Theme toggle control activated.
    ToggleTheme,
    /// Viewport resized.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
}

impl InputEvent {
    /// Screen point where an effect may spawn, if this event qualifies.
    pub fn spawn_point(&self) -> Option<Vec2> {
        match self {
            Self::PointerDown { position, target } => {
                (!target.as_ref().is_some_and(is_interactive)).then_some(*position)
            }
            Self::Swipe { to, target, .. } => {
                (!target.as_ref().is_some_and(is_interactive)).then_some(*to)
            }
            Self::PointerMove { .. } | Self::ToggleTheme | Self::Resize { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_and_buttons_are_interactive() {
        assert!(is_interactive(&ElementInfo::tag("A")));
        assert!(is_interactive(&ElementInfo::tag("button")));
        assert!(is_interactive(&ElementInfo::tag("textarea")));
    }

    #[test]
    fn test_plain_elements_are_not_interactive() {
        assert!(!is_interactive(&ElementInfo::tag("div")));
        assert!(!is_interactive(&ElementInfo::tag("canvas")));
        assert!(!is_interactive(&ElementInfo::tag("p")));
    }

    #[test]
    fn test_roles_labels_and_ancestors_count() {
        let role = ElementInfo {
            role: Some("switch".to_string()),
            ..ElementInfo::tag("div")
        };
        assert!(is_interactive(&role));

        let labeled = ElementInfo {
            has_label: true,
            ..ElementInfo::tag("span")
        };
        assert!(is_interactive(&labeled));

        let nested = ElementInfo {
            inside_interactive: true,
            ..ElementInfo::tag("svg")
        };
        assert!(is_interactive(&nested));

        let decorative = ElementInfo {
            role: Some("presentation".to_string()),
            ..ElementInfo::tag("div")
        };
        assert!(!is_interactive(&decorative));
    }

    #[test]
    fn test_spawn_point_suppressed_over_controls() {
        let over_link = InputEvent::PointerDown {
            position: Vec2::new(10.0, 10.0),
            target: Some(ElementInfo::tag("a")),
        };
        assert_eq!(over_link.spawn_point(), None);

        let over_sky = InputEvent::PointerDown {
            position: Vec2::new(10.0, 10.0),
            target: None,
        };
        assert_eq!(over_sky.spawn_point(), Some(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_swipe_spawns_at_release_point() {
        let swipe = InputEvent::Swipe {
            from: Vec2::new(0.0, 0.0),
            to: Vec2::new(50.0, 20.0),
            target: Some(ElementInfo::tag("section")),
        };
        assert_eq!(swipe.spawn_point(), Some(Vec2::new(50.0, 20.0)));
        assert_eq!(InputEvent::ToggleTheme.spawn_point(), None);
    }
}
