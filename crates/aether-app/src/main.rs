//! Headless sky renderer.
//!
//! Drives a [`SkyEngine`] over a software canvas on virtual time and writes
//! frames as PNG files.

mod platform;
mod raster;
mod store;

use std::path::{Path, PathBuf};

use aether_config::{CliArgs, Config};
use aether_sky::assets::load_image;
use aether_sky::{
    CloudManifest, FrameScheduler, SceneEvent, SkyEngine, Theme, ThemeStore, color,
};
use clap::Parser;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use platform::{PlatformDirs, PlatformError};
use raster::RasterCanvas;
use store::FileThemeStore;

/// Virtual frame interval, seconds.
const FRAME_STEP: f64 = 1.0 / 60.0;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("failed to create output directory {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write frame {}: {source}", path.display())]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        error!("{e}");
        eprintln!("aether: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let mut dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("{e}, falling back to the working directory");
            PlatformDirs::resolve_with_root(Path::new("."))
        }
    };
    if let Some(config_dir) = &args.config {
        dirs = dirs.with_config_dir(config_dir.clone());
    }
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });
    config.apply_cli_overrides(args);

    aether_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Aether sky renderer starting ({}x{}, {} frames)",
        config.viewport.width, config.viewport.height, args.frames
    );
    debug!("Config directory: {}", dirs.config_dir.display());

    let asset_root = config
        .assets
        .root
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs.config_dir.clone());
    let manifest = load_manifest(&asset_root.join(&config.assets.manifest));

    let mut store = FileThemeStore::new(dirs.data_dir.join("state.ron"));
    debug!("Theme store: {}", store.path().display());
    if let Some(label) = &args.theme {
        match Theme::parse(label) {
            Some(theme) => {
                if let Err(e) = store.set(&config.theme.storage_key, theme.label()) {
                    warn!("Failed to apply --theme {label}: {e}");
                }
            }
            None => warn!("Ignoring unknown --theme '{label}'"),
        }
    }

    let canvas = RasterCanvas::new(config.viewport.width, config.viewport.height);
    let mut engine = SkyEngine::new(config, &manifest, canvas, Box::new(store));
    for entry in &manifest.images {
        engine.on_asset(&entry.id, load_image(&asset_root.join(&entry.path)));
    }

    info!("Theme driven in {:?} mode", engine.mode());

    std::fs::create_dir_all(&args.out).map_err(|source| AppError::Output {
        path: args.out.clone(),
        source,
    })?;

    let mut scheduler = FrameScheduler::new();
    scheduler.request();
    let mut now = 0.0;
    for frame in 0..args.frames {
        if args.toggle_at == Some(frame) {
            info!("Toggling theme at frame {frame}");
            let before = engine.mode();
            engine.toggle_theme();
            if engine.mode() != before {
                info!("Theme now driven in {:?} mode", engine.mode());
            }
        }
        if !scheduler.run_frame(now, &mut engine) {
            break;
        }
        report(engine.drain_events());

        let last = frame + 1 == args.frames;
        let periodic = args.every > 0 && frame % args.every == 0;
        if periodic || last {
            write_frame(engine.canvas(), &args.out, frame)?;
        }
        now += FRAME_STEP;
    }

    info!(
        "Rendered {} frames, final theme {} ({:.1})",
        scheduler.frame_count(),
        engine.theme().theme().label(),
        engine.theme().value()
    );
    Ok(())
}

fn load_manifest(path: &Path) -> CloudManifest {
    match CloudManifest::load(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(
                "Failed to load cloud manifest {}: {e}, using built-in list",
                path.display()
            );
            CloudManifest::default()
        }
    }
}

fn report(events: Vec<SceneEvent>) {
    for event in events {
        match event {
            SceneEvent::ThemeFlipped(theme) => info!("Theme flipped to {}", theme.label()),
            SceneEvent::ColorHint(rgb) => info!("Color hint {}", color::hex(rgb)),
            SceneEvent::CloudsReady { count } => info!("Cloud field ready with {count} clouds"),
            SceneEvent::Regenerated {
                stars,
                clouds,
                connections,
            } => info!("Regenerated {stars} stars, {clouds} clouds, {connections} connections"),
        }
    }
}

fn write_frame(canvas: &RasterCanvas, out: &Path, frame: u32) -> Result<(), AppError> {
    let path = out.join(format!("frame_{frame:05}.png"));
    canvas.save(&path).map_err(|source| AppError::Frame {
        path: path.clone(),
        source,
    })?;
    let (width, height) = canvas.image().dimensions();
    debug!("Wrote {} ({width}x{height})", path.display());
    Ok(())
}
