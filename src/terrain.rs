//! Dune terrain: a square vertex grid with a stored baseline height per vertex,
//! re-displaced every frame by a height field sampled at (x, z, time).

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Simplex};

use crate::config::{SceneConfig, Variant};
use crate::math::{mix, srgb};
use crate::types::TerrainVertex;

/// Source of dune heights
pub trait HeightField {
    /// Static shape the animation is layered on
    fn baseline(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }

    /// Animated displacement added to the baseline at `time` seconds
    fn sample(&self, x: f32, z: f32, time: f32) -> f32;

    /// Upper bound on |baseline + sample|, used for shading
    fn amplitude(&self) -> f32;
}

/// Layered simplex noise (fBm) scrolled by a constant wind
pub struct NoiseDunes {
    noise: Simplex,
    amplitude: f32,
    frequency: f64,
    octaves: u32,
    wind: Vec2,
}

impl NoiseDunes {
    pub fn new(seed: u32, amplitude: f32) -> Self {
        Self {
            noise: Simplex::new(seed),
            amplitude,
            frequency: 0.035,
            octaves: 4,
            wind: Vec2::new(1.2, 0.4),
        }
    }

    /// Fractal sum normalized back into [-1, 1]
    fn fbm(&self, x: f64, y: f64, z: f64) -> f32 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..self.octaves {
            total += self.noise.get([x * frequency, y * frequency, z * frequency]) * amplitude;
            norm += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }

        (total / norm).clamp(-1.0, 1.0) as f32
    }
}

impl HeightField for NoiseDunes {
    fn baseline(&self, x: f32, z: f32) -> f32 {
        let f = self.frequency * 0.5;
        // Long ridges across the wind plus broad noise swells
        let ridge = 1.0 - (x * 0.05 + z * 0.02).sin().abs();
        let swell = self.fbm(x as f64 * f, z as f64 * f, 0.0);
        self.amplitude * (0.35 * ridge + 0.25 * swell)
    }

    fn sample(&self, x: f32, z: f32, time: f32) -> f32 {
        let sx = (x + self.wind.x * time) as f64 * self.frequency;
        let sz = (z + self.wind.y * time) as f64 * self.frequency;
        let drift = self.fbm(sx, sz, time as f64 * 0.05);
        let ripple = (x * 0.9 + time * 1.4).sin() * (z * 0.7 - time * 0.8).cos();
        self.amplitude * (0.35 * drift + 0.05 * ripple)
    }

    fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

/// Closed-form sine/cosine waves, no noise tables
pub struct WaveDunes {
    amplitude: f32,
}

impl WaveDunes {
    pub fn new(amplitude: f32) -> Self {
        Self { amplitude }
    }
}

impl HeightField for WaveDunes {
    fn baseline(&self, x: f32, z: f32) -> f32 {
        self.amplitude * 0.5 * (x * 0.08).sin() * (z * 0.06).cos()
    }

    fn sample(&self, x: f32, z: f32, time: f32) -> f32 {
        let swell = (x * 0.15 + time * 0.6).sin() * (z * 0.12 + time * 0.4).cos();
        let ripple = ((x + z) * 0.3 + time * 1.1).sin();
        self.amplitude * (0.35 * swell + 0.15 * ripple)
    }

    fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

/// Fold a 64-bit scene seed into the 32 bits the noise tables take
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Pick the displacement technique for a variant
pub fn height_field_for(config: &SceneConfig) -> Box<dyn HeightField> {
    match config.variant {
        Variant::Rich => Box::new(NoiseDunes::new(noise_seed(config.seed), config.dune_amplitude)),
        Variant::Simple => Box::new(WaveDunes::new(config.dune_amplitude)),
    }
}

/// Sand shade for a height, darker in troughs and pale on crests
pub fn dune_color(height: f32, amplitude: f32) -> Vec3 {
    let t = if amplitude > 0.0 {
        (height / amplitude) * 0.5 + 0.5
    } else {
        0.5
    };
    mix(srgb(178, 120, 76), srgb(242, 210, 160), t)
}

/// Square grid centered on the origin in XZ
pub struct DuneMesh {
    size: f32,
    segments: u32,
    positions: Vec<Vec3>,
    baseline: Vec<f32>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl DuneMesh {
    pub fn new(size: f32, segments: u32, field: &dyn HeightField) -> Self {
        let side = segments as usize + 1;
        let step = size / segments as f32;
        let half = size * 0.5;

        let mut positions = Vec::with_capacity(side * side);
        let mut baseline = Vec::with_capacity(side * side);

        for row in 0..side {
            for col in 0..side {
                let x = -half + col as f32 * step;
                let z = -half + row as f32 * step;
                let y = field.baseline(x, z);
                positions.push(Vec3::new(x, y, z));
                baseline.push(y);
            }
        }

        let mut mesh = Self {
            size,
            segments,
            positions,
            baseline,
            normals: vec![Vec3::Y; side * side],
            indices: Self::grid_indices(segments),
        };
        mesh.recompute_normals();
        mesh
    }

    /// Two triangles per cell, wound so face normals point up
    fn grid_indices(segments: u32) -> Vec<u32> {
        let side = segments + 1;
        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);

        for row in 0..segments {
            for col in 0..segments {
                let a = row * side + col;
                let b = a + side;
                let c = a + 1;
                let d = b + 1;
                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }

        indices
    }

    /// y = baseline + field(x, z, time) for every vertex
    pub fn displace(&mut self, field: &dyn HeightField, time: f32) {
        for (position, base) in self.positions.iter_mut().zip(&self.baseline) {
            position.y = base + field.sample(position.x, position.z, time);
        }
        self.recompute_normals();
    }

    /// Area-weighted vertex normals from the current triangles
    pub fn recompute_normals(&mut self) {
        self.normals.iter_mut().for_each(|n| *n = Vec3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }

        for n in &mut self.normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }
    }

    /// Fill `out` with GPU vertices, reusing its allocation
    pub fn write_vertices(&self, amplitude: f32, out: &mut Vec<TerrainVertex>) {
        out.clear();
        out.extend(self.positions.iter().zip(&self.normals).map(|(p, n)| TerrainVertex {
            position: p.to_array(),
            normal: n.to_array(),
            color: dune_color(p.y, amplitude).to_array(),
        }));
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn baseline(&self) -> &[f32] {
        &self.baseline
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
