use glam::{Quat, Vec3};

use crate::path::TunnelPath;

/// Orthonormal frame at one path sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Rotation-minimizing frames at `segments + 1` evenly spaced arc-length samples.
///
/// The first normal is the world axis least aligned with the starting tangent; every
/// following normal is the previous one rotated by the turn between adjacent tangents,
/// so rings swept along the path do not twist.
pub fn parallel_transport_frames(path: &TunnelPath, segments: usize) -> Vec<Frame> {
    let segments = segments.max(1);
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| unit_or(path.tangent_at(i as f32 / segments as f32), Vec3::Z))
        .collect();

    let mut frames = Vec::with_capacity(tangents.len());

    let t0 = tangents[0];
    let n0 = (least_aligned_axis(t0) - t0 * least_aligned_axis(t0).dot(t0)).normalize_or_zero();
    frames.push(Frame {
        tangent: t0,
        normal: n0,
        binormal: t0.cross(n0).normalize_or_zero(),
    });

    for i in 1..tangents.len() {
        let prev = frames[i - 1];
        let t_cur = tangents[i];

        let axis = prev.tangent.cross(t_cur);
        let mut normal = prev.normal;
        if axis.length() > 1e-8 {
            let angle = prev.tangent.dot(t_cur).clamp(-1.0, 1.0).acos();
            normal = Quat::from_axis_angle(axis.normalize(), angle) * normal;
        }

        // Re-orthogonalize against drift
        normal = (normal - t_cur * normal.dot(t_cur)).normalize_or_zero();
        if normal.length_squared() < 1e-10 {
            normal = (least_aligned_axis(t_cur) - t_cur * least_aligned_axis(t_cur).dot(t_cur))
                .normalize_or_zero();
        }

        frames.push(Frame {
            tangent: t_cur,
            normal,
            binormal: t_cur.cross(normal).normalize_or_zero(),
        });
    }

    frames
}

fn unit_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO {
        fallback
    } else {
        n
    }
}

fn least_aligned_axis(t: Vec3) -> Vec3 {
    let a = t.abs();
    if a.x <= a.y && a.x <= a.z {
        Vec3::X
    } else if a.y <= a.z {
        Vec3::Y
    } else {
        Vec3::Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helix_path() -> TunnelPath {
        let points = (0..8)
            .map(|i| {
                let a = i as f32 / 8.0 * std::f32::consts::TAU;
                Vec3::new(a.cos() * 30.0, (a * 2.0).sin() * 5.0, a.sin() * 30.0)
            })
            .collect();
        TunnelPath::new(points, 0.5).unwrap()
    }

    #[test]
    fn frames_are_orthonormal() {
        let frames = parallel_transport_frames(&helix_path(), 64);
        assert_eq!(frames.len(), 65);

        for f in frames {
            assert!((f.tangent.length() - 1.0).abs() < 1e-4);
            assert!((f.normal.length() - 1.0).abs() < 1e-4);
            assert!((f.binormal.length() - 1.0).abs() < 1e-4);
            assert!(f.tangent.dot(f.normal).abs() < 1e-3);
            assert!(f.tangent.dot(f.binormal).abs() < 1e-3);
            assert!(f.normal.dot(f.binormal).abs() < 1e-3);
        }
    }

    #[test]
    fn normals_do_not_flip_between_samples() {
        let frames = parallel_transport_frames(&helix_path(), 128);
        for pair in frames.windows(2) {
            assert!(pair[0].normal.dot(pair[1].normal) > 0.5);
        }
    }
}
