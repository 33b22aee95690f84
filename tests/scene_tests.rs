use rand::rngs::StdRng;
use rand::SeedableRng;
use tunnel_flight::config::{TubeConfig, TunnelConfig};
use tunnel_flight::math::Rgb8;
use tunnel_flight::scenes::{build_tube, vertex_color, Accent, LabelAtlas};
use tunnel_flight::TunnelScene;

fn scene(seed: u64) -> TunnelScene {
    let config = TunnelConfig::default();
    let path = config.build_path().unwrap();
    TunnelScene::build(&path, &config, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[cfg(test)]
mod scene_tests {
    use super::*;

    #[test]
    fn test_vertex_colors_alternate_for_any_resolution() {
        let config = TunnelConfig::default();
        let path = config.build_path().unwrap();
        let accents = config.accents().unwrap();
        let (a, b) = (accents.0.to_linear(), accents.1.to_linear());

        for (tubular, radial) in [(1, 3), (7, 5), (16, 8), (33, 12), (400, 12)] {
            let tube = TubeConfig {
                tubular_segments: tubular,
                radial_segments: radial,
                ..TubeConfig::default()
            };
            let mesh = build_tube(&path, &tube, accents);
            assert_eq!(mesh.vertices.len(), (tubular + 1) * (radial + 1));

            for (i, v) in mesh.vertices.iter().enumerate() {
                let expected = if i % 2 == 0 { a } else { b };
                assert_eq!(v.color, expected, "vertex {i} of {tubular}x{radial}");
            }
        }
    }

    #[test]
    fn test_vertex_color_helper() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert_eq!(vertex_color(0, a, b), a);
        assert_eq!(vertex_color(1, a, b), b);
        assert_eq!(vertex_color(4801, a, b), b);
    }

    #[test]
    fn test_default_accents() {
        let accents = TunnelConfig::default().accents().unwrap();
        assert_eq!(accents.0, Rgb8::new(0x00, 0xa3, 0xff));
        assert_eq!(accents.1, Rgb8::new(0x00, 0xff, 0xaa));
    }

    #[test]
    fn test_default_scene_sizes() {
        let scene = scene(1);
        assert_eq!(scene.tube.vertices.len(), 401 * 13);
        assert_eq!(scene.tube.indices.len(), 400 * 12 * 6);
        assert_eq!(scene.stars.positions.len(), 1500);
        assert_eq!(scene.labels.len(), 50);
        assert_eq!(scene.atlas.rows, 14);
        assert_eq!(scene.atlas.texture.height, 14 * 64);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = scene(42);
        let b = scene(42);
        assert_eq!(a.stars.positions, b.stars.positions);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.tube.vertices, b.tube.vertices);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = scene(1);
        let b = scene(2);
        assert_ne!(a.stars.positions, b.stars.positions);
    }

    #[test]
    fn test_every_label_has_an_atlas_row() {
        let scene = scene(5);
        for label in &scene.labels {
            let row = LabelAtlas::row(label.token, label.accent);
            assert!(row < scene.atlas.rows);
            let [top, bottom] = scene.atlas.uv_rows(label);
            assert!(top < bottom && bottom <= 1.0);
            assert_eq!(label.size, [20.0, 5.0]);
        }
        assert!(scene.labels.iter().any(|l| l.accent == Accent::A));
    }

    #[test]
    fn test_wireframe_covers_every_triangle_edge_once() {
        let scene = scene(3);
        let edges = scene.tube.wireframe_edges();
        // rings * radial + (rings - 1) * (radial + 1) + quads
        let (t, r) = (400usize, 12usize);
        let expected = (t + 1) * r + t * (r + 1) + t * r;
        assert_eq!(edges.len() / 2, expected);
    }
}
