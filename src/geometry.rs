//! Shared orb mesh: a subdivided icosahedron on the unit sphere.

use std::collections::HashMap;

use glam::Vec3;

use crate::types::SphereVertex;

pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Unit icosphere; each subdivision quadruples the triangle count
pub fn icosphere(subdivisions: u32) -> SphereMesh {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut positions: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    for _ in 0..subdivisions {
        indices = split_triangles(&mut positions, &indices);
    }

    let vertices = positions
        .iter()
        .map(|p| SphereVertex {
            position: p.to_array(),
            normal: p.to_array(),
        })
        .collect();

    SphereMesh { vertices, indices }
}

/// Split every triangle into four at its edge midpoints, pushed back onto the sphere
fn split_triangles(positions: &mut Vec<Vec3>, indices: &[u32]) -> Vec<u32> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut out = Vec::with_capacity(indices.len() * 4);

    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let mid = (positions[a as usize] + positions[b as usize]).normalize();
            positions.push(mid);
            positions.len() as u32 - 1
        })
    };

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);

        out.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_icosahedron() {
        let mesh = icosphere(0);
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 60);
    }

    #[test]
    fn subdivision_counts() {
        // V = 10 * 4^n + 2, F = 20 * 4^n
        let mesh = icosphere(2);
        assert_eq!(mesh.vertices.len(), 162);
        assert_eq!(mesh.indices.len() / 3, 320);
    }

    #[test]
    fn vertices_on_unit_sphere() {
        let mesh = icosphere(3);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex length {}", len);
        }
    }

    #[test]
    fn indices_in_bounds() {
        let mesh = icosphere(2);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }
}
