//! Ambient dust: one flat xyz buffer, recycled to the ceiling when a
//! particle falls through the floor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;

/// Horizontal sway speed in units per second
const SWAY: f32 = 0.35;

pub struct DustField {
    /// x, y, z per particle
    positions: Vec<f32>,
    fall_speeds: Vec<f32>,
    phases: Vec<f32>,
    floor: f32,
    ceiling: f32,
    extent: f32,
    rng: StdRng,
}

impl DustField {
    pub fn new(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed ^ 0xd057);
        let count = config.dust_count;
        let extent = config.spawn_extent();

        let mut positions = Vec::with_capacity(count * 3);
        let mut fall_speeds = Vec::with_capacity(count);
        let mut phases = Vec::with_capacity(count);

        for _ in 0..count {
            positions.extend_from_slice(&[
                rng.gen_range(-extent..extent),
                rng.gen_range(config.dust_floor..config.dust_ceiling),
                rng.gen_range(-extent..extent),
            ]);
            fall_speeds.push(rng.gen_range(0.2..0.9));
            phases.push(rng.gen_range(0.0..std::f32::consts::TAU));
        }

        Self {
            positions,
            fall_speeds,
            phases,
            floor: config.dust_floor,
            ceiling: config.dust_ceiling,
            extent,
            rng,
        }
    }

    pub fn update(&mut self, dt: f32, time: f32) {
        let span = self.extent * 2.0;

        for (i, p) in self.positions.chunks_exact_mut(3).enumerate() {
            let phase = self.phases[i];
            p[0] += (time * 0.5 + phase).sin() * SWAY * dt;
            p[1] -= self.fall_speeds[i] * dt;
            p[2] += (time * 0.4 + phase).cos() * SWAY * dt;

            // Wrap horizontally so sway never carries particles away
            if p[0] > self.extent {
                p[0] -= span;
            } else if p[0] < -self.extent {
                p[0] += span;
            }
            if p[2] > self.extent {
                p[2] -= span;
            } else if p[2] < -self.extent {
                p[2] += span;
            }

            if p[1] < self.floor {
                p[0] = self.rng.gen_range(-self.extent..self.extent);
                p[1] = self.ceiling;
                p[2] = self.rng.gen_range(-self.extent..self.extent);
            }
        }
    }

    /// Flat xyz buffer, ready for upload
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.fall_speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fall_speeds.is_empty()
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn field() -> DustField {
        DustField::new(&SceneConfig::for_variant(Variant::Simple))
    }

    fn heights(field: &DustField) -> impl Iterator<Item = f32> + '_ {
        field.positions().chunks_exact(3).map(|p| p[1])
    }

    #[test]
    fn buffer_is_flat_xyz() {
        let config = SceneConfig::for_variant(Variant::Simple);
        let field = DustField::new(&config);
        assert_eq!(field.len(), config.dust_count);
        assert_eq!(field.positions().len(), config.dust_count * 3);
    }

    #[test]
    fn particle_below_floor_goes_to_ceiling() {
        let mut field = field();
        field.positions[1] = field.floor() - 3.0;
        field.update(0.0, 0.0);
        assert_eq!(field.positions()[1], field.ceiling());
    }

    #[test]
    fn never_left_below_floor() {
        let mut field = field();
        let mut time = 0.0;
        for _ in 0..1000 {
            time += 0.25;
            field.update(0.25, time);
            assert!(heights(&field).all(|y| y >= field.floor()));
        }
    }

    #[test]
    fn stays_inside_horizontal_extent() {
        let config = SceneConfig::for_variant(Variant::Simple);
        let extent = config.spawn_extent();
        let mut field = DustField::new(&config);
        let mut time = 0.0;
        for _ in 0..2000 {
            time += 0.1;
            field.update(0.1, time);
        }
        for p in field.positions().chunks_exact(3) {
            assert!(p[0].abs() <= extent + 1e-3);
            assert!(p[2].abs() <= extent + 1e-3);
        }
    }

    #[test]
    fn empty_field() {
        let config = SceneConfig {
            dust_count: 0,
            ..SceneConfig::for_variant(Variant::Simple)
        };
        let mut field = DustField::new(&config);
        field.update(1.0, 1.0);
        assert!(field.is_empty());
        assert!(field.positions().is_empty());
    }
}
