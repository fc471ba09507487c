//! Command-line argument parsing for the Aether renderer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Aether command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "aether", about = "Animated day/night sky renderer")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Report the viewport as touch capable.
    #[arg(long)]
    pub touch: Option<bool>,

    /// Start theme, `light` or `dark` (overrides the persisted label).
    #[arg(long)]
    pub theme: Option<String>,

    /// Fixed RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Write every Nth frame as a PNG (0 writes only the last).
    #[arg(long, default_value_t = 0)]
    pub every: u32,

    /// Output directory for rendered frames.
    #[arg(long, default_value = "frames")]
    pub out: PathBuf,

    /// Toggle the theme at this frame.
    #[arg(long)]
    pub toggle_at: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.viewport.width = w;
        }
        if let Some(h) = args.height {
            self.viewport.height = h;
        }
        if let Some(touch) = args.touch {
            self.viewport.touch_capable = touch;
        }
        if let Some(seed) = args.seed {
            self.debug.seed = Some(seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            touch: None,
            theme: None,
            seed: None,
            frames: 120,
            every: 0,
            out: PathBuf::from("frames"),
            toggle_at: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            seed: Some(42),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.viewport.width, 1920);
        assert_eq!(config.debug.seed, Some(42));
        // Non-overridden fields retain defaults
        assert_eq!(config.viewport.height, 720);
        assert!(!config.viewport.touch_capable);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "aether",
            "--width",
            "800",
            "--frames",
            "10",
            "--theme",
            "light",
        ]);
        assert_eq!(args.width, Some(800));
        assert_eq!(args.frames, 10);
        assert_eq!(args.theme.as_deref(), Some("light"));
        assert_eq!(args.out, PathBuf::from("frames"));
    }
}
