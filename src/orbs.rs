//! Drifting orbs. A fixed set is spawned once; orbs that sink below the
//! floor are moved back above the ceiling instead of being destroyed.

use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;
use crate::math::hsv_to_rgb;
use crate::types::OrbInstance;

/// Extra height above the ceiling that recycled orbs are scattered over
pub const RESPAWN_SPREAD: f32 = 8.0;

const METAL_TINTS: [[f32; 3]; 4] = [
    [0.95, 0.78, 0.42], // gold
    [0.86, 0.87, 0.92], // silver
    [0.78, 0.48, 0.30], // copper
    [0.72, 0.62, 0.85], // titanium
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbMaterial {
    Reflective,
    Translucent,
}

impl OrbMaterial {
    pub fn metalness(&self) -> f32 {
        match self {
            OrbMaterial::Reflective => 0.9,
            OrbMaterial::Translucent => 0.1,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            OrbMaterial::Reflective => 1.0,
            OrbMaterial::Translucent => 0.45,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Orb {
    pub position: Vec3,
    pub radius: f32,
    pub material: OrbMaterial,
    pub color: [f32; 3],
    /// Sink rate in units per second
    pub drift_speed: f32,
    /// Angular speed of the horizontal wobble
    pub wobble_speed: f32,
    pub wobble_phase: f32,
    pub wobble_radius: f32,
    /// Horizontal center the wobble circles around
    pub anchor: Vec2,
    pub rotation: Quat,
    pub spin_axis: Vec3,
    pub spin_rate: f32,
}

impl Orb {
    /// Horizontal position on the wobble circle at `time` seconds
    pub fn wobble_position(&self, time: f32) -> Vec2 {
        let angle = time * self.wobble_speed + self.wobble_phase;
        self.anchor + Vec2::new(angle.sin(), angle.cos()) * self.wobble_radius
    }

    pub fn to_instance(&self) -> OrbInstance {
        OrbInstance {
            center: self.position.to_array(),
            radius: self.radius,
            color: self.color,
            metalness: self.material.metalness(),
            rotation: self.rotation.to_array(),
            opacity: self.material.opacity(),
            _pad: [0.0; 3],
        }
    }
}

pub struct OrbField {
    orbs: Vec<Orb>,
    floor: f32,
    ceiling: f32,
    extent: f32,
    rng: StdRng,
}

impl OrbField {
    pub fn new(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed ^ 0x0b5_0b5);
        let extent = config.spawn_extent();
        let (floor, ceiling) = (config.orb_floor, config.orb_ceiling);

        let orbs = (0..config.orb_count)
            .map(|i| {
                // Alternate materials so both classes are always present
                let material = if i % 2 == 0 {
                    OrbMaterial::Reflective
                } else {
                    OrbMaterial::Translucent
                };
                let height = rng.gen_range(floor..ceiling);
                Self::spawn(&mut rng, material, extent, height, 0.0)
            })
            .collect();

        Self {
            orbs,
            floor,
            ceiling,
            extent,
            rng,
        }
    }

    /// New orb at `height`, already placed on its wobble circle for `time`
    fn spawn(rng: &mut StdRng, material: OrbMaterial, extent: f32, height: f32, time: f32) -> Orb {
        let anchor = Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
        let color = match material {
            OrbMaterial::Reflective => METAL_TINTS[rng.gen_range(0..METAL_TINTS.len())],
            OrbMaterial::Translucent => hsv_to_rgb(rng.gen::<f32>(), 0.55, 0.95),
        };
        let spin_axis = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(0.2..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize();

        let mut orb = Orb {
            position: Vec3::new(anchor.x, height, anchor.y),
            radius: rng.gen_range(0.6..2.2),
            material,
            color,
            drift_speed: rng.gen_range(0.4..1.4),
            wobble_speed: rng.gen_range(0.3..0.9),
            wobble_phase: rng.gen_range(0.0..std::f32::consts::TAU),
            wobble_radius: rng.gen_range(0.5..2.5),
            anchor,
            rotation: Quat::IDENTITY,
            spin_axis,
            spin_rate: rng.gen_range(0.2..1.0),
        };
        let xz = orb.wobble_position(time);
        orb.position.x = xz.x;
        orb.position.z = xz.y;
        orb
    }

    /// Sink, wobble, spin; recycle anything that fell below the floor
    pub fn update(&mut self, dt: f32, time: f32) {
        for orb in &mut self.orbs {
            orb.position.y -= orb.drift_speed * dt;

            let xz = orb.wobble_position(time);
            orb.position.x = xz.x;
            orb.position.z = xz.y;

            let spin = Quat::from_axis_angle(orb.spin_axis, orb.spin_rate * dt);
            orb.rotation = (spin * orb.rotation).normalize();

            if orb.position.y < self.floor {
                let height = self.ceiling + self.rng.gen_range(0.0..RESPAWN_SPREAD);
                let material = orb.material;
                *orb = Self::spawn(&mut self.rng, material, self.extent, height, time);
                log::trace!("Recycled {:?} orb to y={:.1}", material, height);
            }
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Instances ordered opaque first; returns how many are reflective
    pub fn write_instances(&self, out: &mut Vec<OrbInstance>) -> usize {
        out.clear();
        out.extend(
            self.orbs
                .iter()
                .filter(|o| o.material == OrbMaterial::Reflective)
                .map(Orb::to_instance),
        );
        let reflective = out.len();
        out.extend(
            self.orbs
                .iter()
                .filter(|o| o.material == OrbMaterial::Translucent)
                .map(Orb::to_instance),
        );
        reflective
    }
}
