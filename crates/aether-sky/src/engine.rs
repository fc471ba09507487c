//! The scene engine: one explicit instance owning every component.
//!
//! Hosts construct a [`SkyEngine`], forward input with
//! [`SkyEngine::handle_input`] and asset results with
//! [`SkyEngine::on_asset`], and drive frames through a
//! [`FrameScheduler`](crate::scheduler::FrameScheduler). Signals for the
//! host (theme flips, chrome color hints) queue up as [`SceneEvent`]s.
//!
//! Frame order: debounced resize, rotation and drift, theme, twinkle,
//! effects, draw. Entity positions are final before anything is drawn.

use aether_config::{Config, DeviceClass};
use aether_input::{InputEvent, PointerState, ResizeDebouncer, exceeds_jitter};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::assets::{AssetError, AssetPool, CloudManifest};
use crate::canvas::Canvas;
use crate::constellation::{self, Connection};
use crate::effects::{EffectEngine, EffectKind};
use crate::parallax::ParallaxRotator;
use crate::population::{Cloud, Star, cloud_field_radius, generate_clouds, generate_stars};
use crate::render::{SceneFrame, SceneRenderer};
use crate::scheduler::FrameTarget;
use crate::theme::{
    DayNightCycle, Direction, KeyframeTable, SceneMode, SkyState, Theme, ThemeController,
    ThemeStore, load_theme, persist_theme,
};
use crate::viewport::Viewport;

/// Signals published to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// The theme label crossed the midpoint and was persisted.
    ThemeFlipped(Theme),
    /// Background brightness changed; tint host chrome with this color.
    ColorHint([u8; 3]),
    /// Every cloud image has reported and the cloud field was built.
    CloudsReady {
        /// Clouds generated.
        count: usize,
    },
    /// Populations were rebuilt for a new viewport.
    Regenerated {
        /// Stars generated.
        stars: usize,
        /// Clouds generated.
        clouds: usize,
        /// Constellation edges kept.
        connections: usize,
    },
}

/// Animated sky scene.
pub struct SkyEngine<C: Canvas> {
    config: Config,
    viewport: Viewport,
    generated_for: (u32, u32),
    touch_capable: bool,
    class: DeviceClass,
    rng: ChaCha8Rng,
    stars: Vec<Star>,
    connections: Vec<Connection>,
    clouds: Vec<Cloud>,
    assets: AssetPool,
    rotator: ParallaxRotator,
    effects: EffectEngine,
    theme: ThemeController,
    keyframes: KeyframeTable,
    cycle: Option<DayNightCycle>,
    sky: SkyState,
    pointer: PointerState,
    resize: ResizeDebouncer,
    store: Box<dyn ThemeStore>,
    renderer: SceneRenderer<C>,
    events: Vec<SceneEvent>,
    clock: f64,
    frames: u64,
}

impl<C: Canvas> SkyEngine<C> {
    /// Create an engine seeded from `config.debug.seed`, or from the OS when unset.
    pub fn new(
        config: Config,
        manifest: &CloudManifest,
        canvas: C,
        store: Box<dyn ThemeStore>,
    ) -> Self {
        let rng = match config.debug.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self::with_rng(config, manifest, canvas, store, rng)
    }

    /// Create an engine with an explicit random source.
    pub fn with_rng(
        config: Config,
        manifest: &CloudManifest,
        canvas: C,
        store: Box<dyn ThemeStore>,
        rng: ChaCha8Rng,
    ) -> Self {
        let viewport = Viewport::new(config.viewport.width, config.viewport.height);
        let touch_capable = config.viewport.touch_capable;
        let class = config.device.classify(viewport.width, touch_capable);
        let initial = load_theme(store.as_ref(), &config.theme);
        let theme = ThemeController::new(initial, config.theme.full_duration);
        let keyframes = KeyframeTable::from_config(&config.theme.keyframes);
        let cycle = config.theme.cycle_seconds.map(|period| {
            let mut cycle = DayNightCycle::new(period);
            cycle.sync_to(theme.value(), theme.direction());
            cycle
        });
        let sky = SkyState::resolve(
            &keyframes,
            theme.value(),
            theme.direction(),
            &config.theme,
            &config.clouds,
        );
        let mut renderer = SceneRenderer::new(canvas);
        renderer.resize(viewport);

        let mut engine = Self {
            rotator: ParallaxRotator::new(&config.parallax),
            effects: EffectEngine::new(config.effects.clone()),
            resize: ResizeDebouncer::new(config.resize.debounce_seconds),
            assets: AssetPool::new(manifest),
            viewport,
            generated_for: viewport.size(),
            touch_capable,
            class,
            rng,
            stars: Vec::new(),
            connections: Vec::new(),
            clouds: Vec::new(),
            theme,
            keyframes,
            cycle,
            sky,
            pointer: PointerState::new(),
            store,
            renderer,
            events: Vec::new(),
            clock: 0.0,
            frames: 0,
            config,
        };
        info!(
            width = viewport.width,
            height = viewport.height,
            ?class,
            theme = initial.label(),
            "Sky engine created"
        );
        engine.regenerate();
        engine.push_color_hint();
        engine
    }

    // -- Input -------------------------------------------------------------

    /// Apply one host input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        let spawn_at = event.spawn_point();
        match event {
            InputEvent::PointerMove { position } => {
                self.pointer.on_move(position);
                let offset = self.pointer.offset_from(self.viewport.center());
                self.rotator.bias_from_pointer(offset);
            }
            InputEvent::PointerDown { position, .. } => {
                self.pointer.on_down(position);
                if let Some(at) = spawn_at {
                    let kind = if self.is_night() {
                        EffectKind::ShootingStar
                    } else {
                        EffectKind::Butterfly
                    };
                    self.spawn_effect(kind, at);
                }
                self.pointer.on_up();
            }
            InputEvent::Swipe { from, to, .. } => {
                self.pointer.on_move(to);
                self.rotator.set_direction(to.x - from.x);
                if let Some(at) = spawn_at {
                    let kind = if self.is_night() {
                        EffectKind::ShootingStar
                    } else {
                        EffectKind::Contrail
                    };
                    if !self.effects.spawn_along(kind, at, to - from, &mut self.rng) {
                        debug!("Swipe too short to orient a streak");
                    }
                }
            }
            InputEvent::ToggleTheme => self.toggle_theme(),
            InputEvent::Resize { width, height } => {
                self.resize.push(width, height, self.clock);
            }
        }
    }

    /// Record the load result of cloud image `id`. Builds the cloud field
    /// once every image has reported.
    pub fn on_asset(&mut self, id: &str, result: Result<image::RgbaImage, AssetError>) {
        if self.assets.record(id, result) {
            self.rebuild_clouds();
            self.events.push(SceneEvent::CloudsReady {
                count: self.clouds.len(),
            });
        }
    }

    /// Spawn an effect at screen point `at`.
    pub fn spawn_effect(&mut self, kind: EffectKind, at: Vec2) {
        self.effects.spawn(kind, at, &mut self.rng);
    }

    // -- Theme -------------------------------------------------------------

    /// Head for the opposite theme. Stops the automatic cycle.
    pub fn toggle_theme(&mut self) {
        self.stop_cycle();
        self.theme.toggle();
    }

    /// Head for `theme`. Stops the automatic cycle.
    pub fn set_theme(&mut self, theme: Theme) {
        self.stop_cycle();
        self.theme.request(theme);
    }

    fn stop_cycle(&mut self) {
        if self.cycle.take().is_some() {
            info!("Automatic day/night cycle stopped by explicit theme request");
        }
    }

    fn is_night(&self) -> bool {
        self.theme.value() < crate::theme::MIDPOINT
    }

    fn push_color_hint(&mut self) {
        let hint = match self.theme.theme() {
            Theme::Dark => self.config.theme.dark_color_hint,
            Theme::Light => self.config.theme.light_color_hint,
        };
        self.events.push(SceneEvent::ColorHint(hint));
    }

    // -- Populations -------------------------------------------------------

    /// Rebuild stars, constellation edges and clouds for the current viewport.
    pub fn regenerate(&mut self) {
        self.generated_for = self.viewport.size();
        self.class = self
            .config
            .device
            .classify(self.viewport.width, self.touch_capable);
        self.stars = generate_stars(&self.config.stars, self.viewport, self.class, &mut self.rng);
        let threshold = self.config.constellation.threshold.get(self.class);
        self.connections = constellation::link(&self.stars, threshold, &self.config.constellation);
        self.rebuild_clouds();
        self.rotator.apply(&mut self.stars);
        info!(
            stars = self.stars.len(),
            connections = self.connections.len(),
            clouds = self.clouds.len(),
            class = ?self.class,
            "Regenerated sky"
        );
        self.events.push(SceneEvent::Regenerated {
            stars: self.stars.len(),
            clouds: self.clouds.len(),
            connections: self.connections.len(),
        });
    }

    fn rebuild_clouds(&mut self) {
        self.clouds = generate_clouds(
            &self.config.clouds,
            self.viewport,
            self.class,
            &self.assets,
            &mut self.rng,
        );
        self.rotator.apply(&mut self.clouds);
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        let next = Viewport::new(width, height);
        if next == self.viewport {
            return;
        }
        self.viewport = next;
        self.renderer.resize(next);
        // Measured against the generated size so small steps still add up.
        if exceeds_jitter(self.generated_for, next.size(), self.config.resize.jitter_threshold) {
            self.regenerate();
        } else {
            debug!(width, height, "Resize within jitter threshold, keeping populations");
        }
    }

    // -- Frame -------------------------------------------------------------

    /// Advance the scene by `dt` seconds and draw it.
    pub fn advance_frame(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        self.frames += 1;

        if let Some((width, height)) = self.resize.poll(self.clock) {
            self.apply_resize(width, height);
        }

        self.rotator.advance();
        let field = cloud_field_radius(&self.config.clouds, self.viewport);
        for cloud in &mut self.clouds {
            cloud.drift_by(dt as f32, field);
        }
        self.rotator.apply(&mut self.stars);
        self.rotator.apply(&mut self.clouds);

        let flipped = match self.cycle.as_mut() {
            Some(cycle) => {
                cycle.tick(dt);
                let (value, direction) = (cycle.value(), cycle.direction());
                self.theme.follow(value, direction)
            }
            None => self.theme.tick(self.clock),
        };
        if let Some(theme) = flipped {
            persist_theme(self.store.as_mut(), &self.config.theme.storage_key, theme);
            self.events.push(SceneEvent::ThemeFlipped(theme));
            self.push_color_hint();
        }
        self.sky = SkyState::resolve(
            &self.keyframes,
            self.theme.value(),
            self.theme.direction(),
            &self.config.theme,
            &self.config.clouds,
        );

        let time = self.clock as f32;
        let (floor, amplitude) = (self.config.stars.twinkle_floor, self.config.stars.twinkle_amplitude);
        for star in &mut self.stars {
            star.twinkle(time, floor, amplitude);
        }

        self.effects.update(self.viewport);

        let frame = SceneFrame {
            viewport: self.viewport,
            sky: &self.sky,
            stars: &self.stars,
            connections: &self.connections,
            clouds: &self.clouds,
            assets: &self.assets,
            effects: &self.effects,
            constellation: &self.config.constellation,
            link_threshold: self.config.constellation.threshold.get(self.class),
            pulse_amplitude: self.config.clouds.pulse_amplitude,
            time,
        };
        self.renderer.render(&frame);
        self.pointer.clear_transients();
    }

    // -- Accessors ---------------------------------------------------------

    /// Take every queued host signal.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Device class of the current populations.
    pub fn device_class(&self) -> DeviceClass {
        self.class
    }

    /// Stars, positioned for the last frame.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Constellation edges.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Clouds, far to near.
    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    /// Live effects.
    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    /// Mutable effect engine, for hosts spawning effects with explicit parameters.
    pub fn effects_mut(&mut self) -> &mut EffectEngine {
        &mut self.effects
    }

    /// Theme transition state.
    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    /// Theme-derived visual state of the last frame.
    pub fn sky(&self) -> &SkyState {
        &self.sky
    }

    /// Rotation state.
    pub fn rotator(&self) -> &ParallaxRotator {
        &self.rotator
    }

    /// How the theme scalar is driven.
    pub fn mode(&self) -> SceneMode {
        if self.cycle.is_some() {
            SceneMode::Continuous
        } else {
            SceneMode::Discrete
        }
    }

    /// Cloud image pool.
    pub fn assets(&self) -> &AssetPool {
        &self.assets
    }

    /// The drawing surface.
    pub fn canvas(&self) -> &C {
        self.renderer.canvas()
    }

    /// Mutable drawing surface.
    pub fn canvas_mut(&mut self) -> &mut C {
        self.renderer.canvas_mut()
    }

    /// Scene time, seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Last movement direction of the theme scalar.
    pub fn direction(&self) -> Direction {
        self.theme.direction()
    }
}

impl<C: Canvas> FrameTarget for SkyEngine<C> {
    fn update(&mut self, dt: f64) -> bool {
        self.advance_frame(dt);
        true
    }
}
