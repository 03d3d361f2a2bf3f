use glam::{Mat4, Vec2, Vec3};

use crate::core::DisplayContext;
use crate::lighting::LightingState;
use crate::types::SceneUniform;

pub const DEFAULT_FOV_Y: f32 = 55.0 * std::f32::consts::PI / 180.0;
/// How quickly the parallax offset catches up with the pointer, per second
pub const PARALLAX_RATE: f32 = 2.5;

const EYE: Vec3 = Vec3::new(0.0, 9.0, 38.0);
const TARGET: Vec3 = Vec3::new(0.0, 4.0, 0.0);

/// Fixed perspective camera that sways slightly with the pointer
#[derive(Debug, Clone)]
pub struct Camera {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    viewport: DisplayContext,
    pub position: Vec3,
    pub target: Vec3,
    /// Eased offset applied to the eye, in world units
    parallax: Vec2,
    parallax_scale: f32,
}

impl Camera {
    /// Camera for a viewport; an empty viewport falls back to a square aspect
    pub fn new(viewport: DisplayContext, parallax_scale: f32) -> Self {
        Self {
            fov_y: DEFAULT_FOV_Y,
            near: 0.1,
            far: 400.0,
            aspect: viewport.aspect_ratio().unwrap_or(1.0),
            viewport,
            position: EYE,
            target: TARGET,
            parallax: Vec2::ZERO,
            parallax_scale,
        }
    }

    /// Update viewport and aspect together. Zero-sized requests are ignored
    /// and leave both untouched; returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let viewport = DisplayContext::new(width, height);
        match viewport.aspect_ratio() {
            Some(aspect) if viewport != self.viewport => {
                self.viewport = viewport;
                self.aspect = aspect;
                true
            }
            _ => false,
        }
    }

    /// Ease the parallax offset toward the pointer position
    pub fn apply_pointer(&mut self, pointer: Vec2, dt: f32) {
        let goal = pointer.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)) * self.parallax_scale;
        let k = 1.0 - (-PARALLAX_RATE * dt.max(0.0)).exp();
        self.parallax += (goal - self.parallax) * k;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn viewport(&self) -> DisplayContext {
        self.viewport
    }

    pub fn parallax(&self) -> Vec2 {
        self.parallax
    }

    /// Eye position including parallax; vertical sway is half the horizontal
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::new(self.parallax.x, self.parallax.y * 0.5, 0.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(
        &self,
        lighting: &LightingState,
        time: f32,
        fog: (f32, f32),
        dust_size: f32,
    ) -> SceneUniform {
        SceneUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            camera_position: self.eye().to_array(),
            time,
            sun_direction: lighting.sun_direction.to_array(),
            sun_intensity: lighting.sun_intensity,
            sun_color: lighting.sun_color.to_array(),
            fog_near: fog.0,
            ambient_color: lighting.ambient_color.to_array(),
            fog_far: fog.1,
            fog_color: lighting.fog_color.to_array(),
            dust_size,
        }
    }
}
