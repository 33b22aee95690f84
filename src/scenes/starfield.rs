use glam::Vec3;
use rand::Rng;

use crate::config::StarConfig;

/// Static background stars, uniform inside a cube centered on the origin
#[derive(Debug, Clone)]
pub struct Starfield {
    pub positions: Vec<Vec3>,
    pub half_extent: f32,
}

pub fn build_starfield<R: Rng + ?Sized>(config: &StarConfig, rng: &mut R) -> Starfield {
    let h = config.half_extent;
    let positions = (0..config.count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-h..h),
                rng.gen_range(-h..h),
                rng.gen_range(-h..h),
            )
        })
        .collect();

    Starfield {
        positions,
        half_extent: h,
    }
}
