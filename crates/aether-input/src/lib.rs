//! Input vocabulary for the sky scene: pointer/touch events, interactive
//! target classification, pointer tracking, and resize debouncing.

pub mod event;
pub mod pointer;
pub mod resize;

pub use event::{ElementInfo, InputEvent, is_interactive};
pub use pointer::PointerState;
pub use resize::{ResizeDebouncer, exceeds_jitter};
