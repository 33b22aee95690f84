use glam::Vec3;
use tunnel_flight::config::TunnelConfig;
use tunnel_flight::path::TunnelPath;
use tunnel_flight::TunnelError;

fn default_path() -> TunnelPath {
    TunnelConfig::default().build_path().unwrap()
}

#[cfg(test)]
mod path_tests {
    use super::*;

    #[test]
    fn test_point_at_is_deterministic() {
        let a = default_path();
        let b = default_path();
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            assert_eq!(a.point_at(t), b.point_at(t), "t = {t}");
        }
    }

    #[test]
    fn test_point_at_has_no_jumps() {
        let path = default_path();
        let steps = 10_000;
        let expected_step = path.length() / steps as f32;

        let mut prev = path.point_at(0.0);
        for i in 1..=steps {
            let p = path.point_at(i as f32 / steps as f32);
            let step = p.distance(prev);
            assert!(
                step < expected_step * 3.0,
                "jump of {step} at sample {i}, expected about {expected_step}"
            );
            prev = p;
        }
    }

    #[test]
    fn test_segment_boundaries_are_continuous() {
        let path = default_path();
        let n = path.segment_count();
        for k in 1..n {
            let u = k as f32 / n as f32;
            let before = path.point(u - 1e-4);
            let after = path.point(u + 1e-4);
            assert!(
                before.distance(after) < 1.0,
                "discontinuity at segment boundary {k}"
            );
        }
    }

    #[test]
    fn test_loop_closes() {
        let path = default_path();
        let start = path.point_at(0.0);
        let end = path.point_at(1.0 - 1e-6);
        assert!(start.distance(end) < 0.05, "{start:?} vs {end:?}");
        assert_eq!(path.point_at(1.0), start);
    }

    #[test]
    fn test_curve_passes_through_control_points() {
        let path = default_path();
        let n = path.segment_count();
        for (i, cp) in path.control_points().iter().enumerate() {
            let p = path.point(i as f32 / n as f32);
            assert!(p.distance(*cp) < 1e-3, "control point {i}");
        }
    }

    #[test]
    fn test_tangent_follows_motion() {
        let path = default_path();
        for i in 0..50 {
            let t = i as f32 / 50.0;
            let tangent = path.tangent_at(t);
            let ahead = path.point_at(t + 1e-3) - path.point_at(t);
            assert!(tangent.length() > 0.0);
            assert!(tangent.dot(ahead) > 0.0, "tangent opposes motion at t = {t}");
        }
    }

    #[test]
    fn test_too_few_points_rejected() {
        let points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(matches!(
            TunnelPath::new(points, 0.5),
            Err(TunnelError::TooFewControlPoints(3))
        ));
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let points = vec![Vec3::ZERO, Vec3::X, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y];
        assert!(matches!(
            TunnelPath::new(points, 0.5),
            Err(TunnelError::NonFiniteControlPoint { index: 2 })
        ));
    }
}
