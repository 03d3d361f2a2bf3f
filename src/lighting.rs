// lighting.rs - Time-of-day scalar and the lighting it drives
use chrono::Timelike;
use glam::Vec3;

use crate::math::srgb;

/// How quickly the displayed time of day catches up with its target (1/s)
pub const EASE_RATE: f32 = 3.0;

/// Interpolation parameter in [0, 1]: 0 = dawn, 1 = night
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct TimeOfDay(f32);

impl TimeOfDay {
    pub const DAWN: TimeOfDay = TimeOfDay(0.0);
    pub const NIGHT: TimeOfDay = TimeOfDay(1.0);

    /// Clamp into [0, 1]; NaN becomes dawn
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Fraction of the scrollable range that has been scrolled past
    pub fn from_scroll(offset: f32, max_offset: f32) -> Self {
        if !(max_offset > 0.0) {
            return Self::DAWN;
        }
        Self::new(offset / max_offset)
    }

    /// Map a wall-clock time: 06:00 is dawn, midnight and the small hours are night
    pub fn from_local_time<T: Timelike>(time: &T) -> Self {
        let hours = time.hour() as f32 + time.minute() as f32 / 60.0 + time.second() as f32 / 3600.0;
        if hours < 6.0 {
            Self::NIGHT
        } else {
            Self::new((hours - 6.0) / 18.0)
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Step toward `target` with exponential easing over `dt` seconds
    pub fn eased_toward(self, target: TimeOfDay, dt: f32) -> Self {
        let k = 1.0 - (-EASE_RATE * dt.max(0.0)).exp();
        Self::new(self.0 + (target.0 - self.0) * k)
    }
}

/// Lighting parameters at one point of the day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    pub ambient_color: Vec3,
    pub background: Vec3,
    pub fog_color: Vec3,
}

impl Keyframe {
    /// Weighted blend; exact at both ends so keyframes are hit precisely
    fn lerp(&self, other: &Keyframe, t: f32) -> Keyframe {
        let t = t.clamp(0.0, 1.0);
        let blend = |a: Vec3, b: Vec3| a * (1.0 - t) + b * t;
        Keyframe {
            sun_color: blend(self.sun_color, other.sun_color),
            sun_intensity: self.sun_intensity * (1.0 - t) + other.sun_intensity * t,
            ambient_color: blend(self.ambient_color, other.ambient_color),
            background: blend(self.background, other.background),
            fog_color: blend(self.fog_color, other.fog_color),
        }
    }
}

/// Evenly spaced keyframes across [0, 1]
#[derive(Debug, Clone)]
pub struct Palette {
    keyframes: Vec<Keyframe>,
}

impl Palette {
    /// Dawn, noon, dusk, night
    pub fn desert() -> Self {
        Self {
            keyframes: vec![
                Keyframe {
                    sun_color: srgb(255, 178, 128),
                    sun_intensity: 0.9,
                    ambient_color: srgb(150, 120, 140),
                    background: srgb(248, 196, 170),
                    fog_color: srgb(240, 200, 180),
                },
                Keyframe {
                    sun_color: srgb(255, 246, 228),
                    sun_intensity: 1.3,
                    ambient_color: srgb(170, 175, 190),
                    background: srgb(160, 200, 240),
                    fog_color: srgb(215, 225, 235),
                },
                Keyframe {
                    sun_color: srgb(255, 130, 80),
                    sun_intensity: 0.95,
                    ambient_color: srgb(140, 100, 120),
                    background: srgb(220, 120, 100),
                    fog_color: srgb(200, 125, 115),
                },
                Keyframe {
                    sun_color: srgb(140, 160, 230),
                    sun_intensity: 0.35,
                    ambient_color: srgb(40, 45, 80),
                    background: srgb(12, 14, 36),
                    fog_color: srgb(18, 20, 44),
                },
            ],
        }
    }

    /// Build from custom keyframes; needs at least one
    pub fn new(keyframes: Vec<Keyframe>) -> Option<Self> {
        if keyframes.is_empty() {
            None
        } else {
            Some(Self { keyframes })
        }
    }

    pub fn sample(&self, time: TimeOfDay) -> Keyframe {
        let segments = self.keyframes.len() - 1;
        if segments == 0 {
            return self.keyframes[0];
        }

        let scaled = time.value() * segments as f32;
        let index = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - index as f32;
        self.keyframes[index].lerp(&self.keyframes[index + 1], local)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::desert()
    }
}

/// Everything the renderer needs from the lighting model in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingState {
    pub time_of_day: TimeOfDay,
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    pub ambient_color: Vec3,
    pub background: Vec3,
    pub fog_color: Vec3,
}

/// Sun arc: low in the east at dawn, overhead at noon, low in the west at night
pub fn sun_direction(time: TimeOfDay) -> Vec3 {
    let angle = std::f32::consts::PI * (0.1 + 0.8 * time.value());
    Vec3::new(angle.cos(), angle.sin() * 0.9 + 0.1, -0.35).normalize()
}

/// Eased time of day plus the palette it samples
#[derive(Debug, Clone)]
pub struct Lighting {
    palette: Palette,
    current: TimeOfDay,
    target: TimeOfDay,
}

impl Lighting {
    pub fn new(palette: Palette, start: TimeOfDay) -> Self {
        Self {
            palette,
            current: start,
            target: start,
        }
    }

    pub fn set_target(&mut self, target: TimeOfDay) {
        self.target = target;
    }

    pub fn update(&mut self, dt: f32) {
        self.current = self.current.eased_toward(self.target, dt);
    }

    /// Jump straight to `time` without easing
    pub fn snap_to(&mut self, time: TimeOfDay) {
        self.current = time;
        self.target = time;
    }

    pub fn current(&self) -> TimeOfDay {
        self.current
    }

    pub fn target(&self) -> TimeOfDay {
        self.target
    }

    pub fn state(&self) -> LightingState {
        let key = self.palette.sample(self.current);
        LightingState {
            time_of_day: self.current,
            sun_direction: sun_direction(self.current),
            sun_color: key.sun_color,
            sun_intensity: key.sun_intensity,
            ambient_color: key.ambient_color,
            background: key.background,
            fog_color: key.fog_color,
        }
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(Palette::desert(), TimeOfDay::DAWN)
    }
}
