use std::collections::HashSet;

use crate::config::TubeConfig;
use crate::math::{parallel_transport_frames, Rgb8};
use crate::path::TunnelPath;
use crate::types::TubeVertex;

/// Tube surface swept along the path
#[derive(Debug, Clone)]
pub struct TubeMesh {
    pub vertices: Vec<TubeVertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    pub tubular_segments: usize,
    pub radial_segments: usize,
}

impl TubeMesh {
    /// Number of vertices in each ring, including the duplicated seam vertex
    pub fn ring_len(&self) -> usize {
        self.radial_segments + 1
    }

    pub fn ring_count(&self) -> usize {
        self.tubular_segments + 1
    }

    /// Unique triangle edges as a line list, in first-seen order
    pub fn wireframe_edges(&self) -> Vec<u32> {
        let mut seen = HashSet::with_capacity(self.indices.len());
        let mut edges = Vec::with_capacity(self.indices.len() * 2);

        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    edges.extend_from_slice(&[a, b]);
                }
            }
        }

        edges
    }
}

/// Color of the vertex at sequential index `i`: A on even, B on odd
pub fn vertex_color(index: usize, accent_a: [f32; 3], accent_b: [f32; 3]) -> [f32; 3] {
    if index % 2 == 0 {
        accent_a
    } else {
        accent_b
    }
}

/// Sweep rings of `radial_segments + 1` vertices along `tubular_segments + 1` path samples
pub fn build_tube(path: &TunnelPath, config: &TubeConfig, accents: (Rgb8, Rgb8)) -> TubeMesh {
    let tubular = config.tubular_segments.max(1);
    let radial = config.radial_segments.max(3);
    let ring_len = radial + 1;

    let accent_a = accents.0.to_linear();
    let accent_b = accents.1.to_linear();

    let frames = parallel_transport_frames(path, tubular);
    let mut vertices = Vec::with_capacity((tubular + 1) * ring_len);

    for (j, frame) in frames.iter().enumerate() {
        let center = path.point_at(j as f32 / tubular as f32);

        for i in 0..ring_len {
            let angle = i as f32 / radial as f32 * std::f32::consts::TAU;
            let dir = frame.normal * angle.cos() + frame.binormal * angle.sin();
            let position = center + dir * config.radius;

            let color = vertex_color(vertices.len(), accent_a, accent_b);
            vertices.push(TubeVertex {
                position: position.to_array(),
                color,
            });
        }
    }

    let mut indices = Vec::with_capacity(tubular * radial * 6);
    for j in 0..tubular {
        let ring0 = j * ring_len;
        let ring1 = (j + 1) * ring_len;
        for i in 0..radial {
            let a = (ring0 + i) as u32;
            let b = (ring1 + i) as u32;
            let c = (ring1 + i + 1) as u32;
            let d = (ring0 + i + 1) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    log::debug!(
        "Tube built: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );

    TubeMesh {
        vertices,
        indices,
        tubular_segments: tubular,
        radial_segments: radial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunnelConfig;

    fn small_tube(tubular: usize, radial: usize) -> TubeMesh {
        let config = TunnelConfig::default();
        let path = config.build_path().unwrap();
        let tube = TubeConfig {
            tubular_segments: tubular,
            radial_segments: radial,
            ..TubeConfig::default()
        };
        build_tube(&path, &tube, config.accents().unwrap())
    }

    #[test]
    fn vertex_and_index_counts() {
        let mesh = small_tube(10, 6);
        assert_eq!(mesh.vertices.len(), 11 * 7);
        assert_eq!(mesh.indices.len(), 10 * 6 * 6);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn vertices_sit_on_radius() {
        let config = TunnelConfig::default();
        let path = config.build_path().unwrap();
        let mesh = small_tube(20, 8);

        for (j, ring) in mesh.vertices.chunks(mesh.ring_len()).enumerate() {
            let center = path.point_at(j as f32 / 20.0);
            for v in ring {
                let d = glam::Vec3::from_array(v.position).distance(center);
                assert!((d - 4.0).abs() < 1e-2, "ring {j}: distance {d}");
            }
        }
    }

    #[test]
    fn wireframe_edges_are_unique() {
        let mesh = small_tube(4, 4);
        let edges = mesh.wireframe_edges();
        assert_eq!(edges.len() % 2, 0);

        let mut seen = HashSet::new();
        for pair in edges.chunks_exact(2) {
            assert!(seen.insert((pair[0].min(pair[1]), pair[0].max(pair[1]))));
        }
        // per quad: one longitudinal, one ring, one diagonal; plus closing ring and seam edges
        assert_eq!(seen.len(), 4 * 4 * 3 + 4 + 4);
    }
}
