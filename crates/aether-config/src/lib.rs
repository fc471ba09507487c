//! Configuration system for the Aether sky scene.
//!
//! Every tunable of the scene generator and animation engine lives here as a
//! plain serde struct. Settings persist to disk as RON, accept CLI overrides
//! via clap, and stay forward/backward compatible through `#[serde(default)]`.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, ButterflyConfig, CloudCategoryConfig, CloudConfig, Config, ConstellationConfig,
    DebugConfig, DeviceClass, DeviceConfig, EffectsConfig, FadeCurve, KeyframeConfig,
    ParallaxConfig, PerDevice, ResizeConfig, StarConfig, StarTypeConfig, StreakConfig,
    ThemeConfig, ViewportConfig,
};
pub use error::ConfigError;
