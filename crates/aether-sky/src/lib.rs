//! Procedural sky scene: starfield by night, cloud field by day.
//!
//! Populations are generated once per viewport ([`population`],
//! [`constellation`]); every frame the [`parallax`] rotator positions them,
//! the [`theme`] controller interpolates the day/night state, and the
//! [`render`] layer draws everything onto a [`canvas::Canvas`] together with
//! the short-lived [`effects`] spawned by input. [`SkyEngine`] ties the
//! pieces together and is driven by a [`scheduler::FrameScheduler`].

pub mod assets;
pub mod canvas;
pub mod color;
pub mod constellation;
pub mod effects;
pub mod engine;
pub mod parallax;
pub mod population;
pub mod render;
pub mod scheduler;
pub mod theme;
pub mod viewport;
pub mod weighted;

pub use assets::{AssetError, AssetPool, CloudManifest, CloudSet, ImageId, SkyImage};
pub use canvas::{BlendMode, Canvas, GradientStop, ImagePlacement};
pub use constellation::Connection;
pub use effects::{ActiveEffect, EffectEngine, EffectKind, TransientEffect};
pub use engine::{SceneEvent, SkyEngine};
pub use parallax::{ParallaxRotator, Positioned};
pub use population::{Cloud, CloudCategory, Star};
pub use render::{SceneFrame, SceneRenderer};
pub use scheduler::{FrameHandle, FrameScheduler, FrameTarget};
pub use theme::{
    DayNightCycle, Direction, IconState, KeyframeTable, MemoryStore, SceneMode, SkyState,
    StoreError, Theme, ThemeController, ThemeStore, TransitionHandle,
};
pub use viewport::Viewport;
