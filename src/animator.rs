//! The scene animator: builds the backdrop once, then advances it per frame.

use chrono::Timelike;
use glam::Vec3;

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::core::{DisplayContext, Signals};
use crate::dust::DustField;
use crate::host::{self, Host};
use crate::lighting::{Lighting, LightingState, TimeOfDay};
use crate::orbs::OrbField;
use crate::terrain::{height_field_for, DuneMesh, HeightField};
use crate::types::SceneUniform;

/// Longest step a single frame may take; longer gaps (a hidden window) are cut short
pub const MAX_FRAME_DELTA: f32 = 0.1;
/// World-space half size of a dust billboard
pub const DUST_SIZE: f32 = 0.12;
/// A clock target this far behind the previous one is the night-to-dawn wrap
const CLOCK_WRAP: f32 = 0.5;

/// Everything the renderer uploads for one frame
pub struct Snapshot<'a> {
    pub uniform: SceneUniform,
    pub terrain: &'a DuneMesh,
    pub dune_amplitude: f32,
    pub orbs: &'a OrbField,
    pub dust: &'a [f32],
    pub background: Vec3,
    pub time_of_day: TimeOfDay,
}

pub struct SceneAnimator {
    config: SceneConfig,
    camera: Camera,
    terrain: DuneMesh,
    field: Box<dyn HeightField>,
    orbs: OrbField,
    dust: DustField,
    lighting: Lighting,
    elapsed: f32,
    frames: u64,
}

impl SceneAnimator {
    /// Run the startup guards and build the scene only if all of them pass
    pub fn mount(host: &dyn Host, config: SceneConfig) -> Option<Self> {
        match host::check(host, &config) {
            Ok(viewport) => Some(Self::new(config, viewport)),
            Err(reason) => {
                log::info!("Dune backdrop skipped: {}", reason);
                None
            }
        }
    }

    pub fn new(config: SceneConfig, viewport: DisplayContext) -> Self {
        let field = height_field_for(&config);
        let terrain = DuneMesh::new(config.terrain_size, config.segments, field.as_ref());
        let orbs = OrbField::new(&config);
        let dust = DustField::new(&config);
        let camera = Camera::new(viewport, config.pointer_parallax);

        log::info!(
            "Built {} backdrop: {} terrain vertices, {} orbs, {} dust particles",
            config.variant.name(),
            terrain.vertex_count(),
            orbs.orbs().len(),
            dust.len()
        );

        Self {
            config,
            camera,
            terrain,
            field,
            orbs,
            dust,
            lighting: Lighting::default(),
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Advance the scene by one frame
    pub fn frame(&mut self, delta: f32, signals: &Signals) {
        if self.config.follow_clock {
            self.frame_at_clock(delta, signals, &chrono::Local::now());
        } else {
            self.step(delta, signals, TimeOfDay::new(signals.scroll_fraction));
        }
    }

    /// One frame with the lighting following the wall-clock time `now`
    pub fn frame_at_clock<T: Timelike>(&mut self, delta: f32, signals: &Signals, now: &T) {
        let target = TimeOfDay::from_local_time(now);
        // Night rolls over into dawn; easing would sweep back through the whole day
        if self.lighting.target().value() - target.value() > CLOCK_WRAP {
            log::debug!("Clock wrapped to dawn");
            self.lighting.snap_to(target);
        }
        self.step(delta, signals, target);
    }

    /// One frame with an explicit lighting target
    pub fn step(&mut self, delta: f32, signals: &Signals, target: TimeOfDay) {
        let dt = if delta.is_finite() {
            delta.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.frames += 1;

        self.lighting.set_target(target);
        self.lighting.update(dt);
        self.camera.apply_pointer(signals.pointer, dt);
        self.terrain.displace(self.field.as_ref(), self.elapsed);
        self.orbs.update(dt, self.elapsed);
        self.dust.update(dt, self.elapsed);
    }

    /// Returns whether the projection changed
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let changed = self.camera.resize(width, height);
        if changed {
            log::debug!("Viewport resized to {}x{}", width, height);
        }
        changed
    }

    /// Linear fog range scaled to the terrain
    pub fn fog_range(&self) -> (f32, f32) {
        (self.config.terrain_size * 0.25, self.config.terrain_size * 0.95)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let lighting = self.lighting.state();
        Snapshot {
            uniform: self
                .camera
                .to_uniform(&lighting, self.elapsed, self.fog_range(), DUST_SIZE),
            terrain: &self.terrain,
            dune_amplitude: self.config.dune_amplitude,
            orbs: &self.orbs,
            dust: self.dust.positions(),
            background: lighting.background,
            time_of_day: lighting.time_of_day,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn terrain(&self) -> &DuneMesh {
        &self.terrain
    }

    pub fn orbs(&self) -> &OrbField {
        &self.orbs
    }

    pub fn dust(&self) -> &DustField {
        &self.dust
    }

    pub fn lighting(&self) -> LightingState {
        self.lighting.state()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use chrono::NaiveTime;
    use glam::Vec2;

    fn animator() -> SceneAnimator {
        SceneAnimator::new(
            SceneConfig::for_variant(Variant::Simple),
            DisplayContext::new(1280, 720),
        )
    }

    #[test]
    fn frame_advances_time() {
        let mut scene = animator();
        scene.frame(0.016, &Signals::default());
        scene.frame(0.016, &Signals::default());
        assert_eq!(scene.frame_count(), 2);
        assert!((scene.elapsed() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut scene = animator();
        scene.frame(5.0, &Signals::default());
        assert_eq!(scene.elapsed(), MAX_FRAME_DELTA);
    }

    #[test]
    fn bad_deltas_do_not_move_time() {
        let mut scene = animator();
        scene.frame(-1.0, &Signals::default());
        scene.frame(f32::NAN, &Signals::default());
        assert_eq!(scene.elapsed(), 0.0);
        assert_eq!(scene.frame_count(), 2);
    }

    #[test]
    fn scroll_drives_time_of_day() {
        let mut scene = animator();
        let signals = Signals {
            pointer: Vec2::ZERO,
            scroll_fraction: 1.0,
        };
        let before = scene.lighting().time_of_day.value();
        for _ in 0..50 {
            scene.frame(0.1, &signals);
        }
        let after = scene.lighting().time_of_day.value();
        assert!(after > before);
        assert!(after <= 1.0);
    }

    #[test]
    fn explicit_target_overrides_scroll() {
        let mut scene = animator();
        for _ in 0..100 {
            scene.step(0.1, &Signals::default(), TimeOfDay::new(0.5));
        }
        assert!((scene.lighting().time_of_day.value() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn clock_wrap_snaps_to_dawn() {
        let mut scene = animator();
        let before_dawn = NaiveTime::from_hms_opt(5, 59, 59).unwrap();
        for _ in 0..100 {
            scene.frame_at_clock(0.1, &Signals::default(), &before_dawn);
        }
        assert!(scene.lighting().time_of_day.value() > 0.99);

        let dawn = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        scene.frame_at_clock(0.016, &Signals::default(), &dawn);
        assert_eq!(scene.lighting().time_of_day, TimeOfDay::DAWN);
    }

    #[test]
    fn clock_advances_forward_through_the_day() {
        let mut scene = animator();
        let mut previous = scene.lighting().time_of_day.value();
        for hour in 6..24 {
            let now = NaiveTime::from_hms_opt(hour, 30, 0).unwrap();
            for _ in 0..20 {
                scene.frame_at_clock(0.1, &Signals::default(), &now);
                let value = scene.lighting().time_of_day.value();
                assert!(value >= previous);
                previous = value;
            }
        }
    }

    #[test]
    fn follow_clock_frame_stays_in_range() {
        let config = SceneConfig {
            follow_clock: true,
            ..SceneConfig::for_variant(Variant::Simple)
        };
        let mut scene = SceneAnimator::new(config, DisplayContext::new(1280, 720));
        // Scroll is ignored while following the clock
        let signals = Signals {
            pointer: Vec2::ZERO,
            scroll_fraction: 0.5,
        };
        for _ in 0..10 {
            scene.frame(0.1, &signals);
            let value = scene.lighting().time_of_day.value();
            assert!((0.0..=1.0).contains(&value));
        }
        assert_eq!(scene.frame_count(), 10);
    }

    #[test]
    fn terrain_moves_between_frames() {
        let mut scene = animator();
        scene.frame(0.05, &Signals::default());
        let before = scene.terrain().positions().to_vec();
        scene.frame(0.05, &Signals::default());
        assert_ne!(before, scene.terrain().positions());
    }

    #[test]
    fn resize_reaches_camera() {
        let mut scene = animator();
        assert!(scene.resize(500, 1000));
        assert_eq!(scene.camera().aspect(), 0.5);
        assert!(!scene.resize(0, 0));
        assert_eq!(scene.camera().aspect(), 0.5);
    }

    #[test]
    fn snapshot_matches_scene() {
        let scene = animator();
        let snapshot = scene.snapshot();
        assert_eq!(snapshot.dust.len(), scene.dust().len() * 3);
        assert_eq!(snapshot.orbs.orbs().len(), scene.orbs().orbs().len());
        assert_eq!(snapshot.background, scene.lighting().background);
        let (near, far) = scene.fog_range();
        assert!(near < far);
        assert_eq!(snapshot.uniform.fog_far, far);
    }
}
