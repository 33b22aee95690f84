mod labels;
mod starfield;
mod tube;

pub use labels::{build_labels, rasterize_label, Accent, LabelAtlas, LabelSprite, LabelTexture};
pub use starfield::{build_starfield, Starfield};
pub use tube::{build_tube, vertex_color, TubeMesh};

use rand::Rng;

use crate::config::TunnelConfig;
use crate::error::Result;
use crate::math::Rgb8;
use crate::path::TunnelPath;

/// Everything drawn in the tunnel, built once per mount
#[derive(Debug, Clone)]
pub struct TunnelScene {
    pub tube: TubeMesh,
    pub stars: Starfield,
    pub labels: Vec<LabelSprite>,
    pub atlas: LabelAtlas,
}

impl TunnelScene {
    /// Stars are drawn from `rng` before labels, so a seed fixes both
    pub fn build<R: Rng + ?Sized>(
        path: &TunnelPath,
        config: &TunnelConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let accents: (Rgb8, Rgb8) = config.accents()?;

        let tube = build_tube(path, &config.tube, accents);
        let stars = build_starfield(&config.stars, rng);
        let labels = build_labels(path, &config.labels, rng);
        let atlas = LabelAtlas::build(
            &config.labels.vocabulary,
            accents,
            config.labels.texture_width,
            config.labels.texture_height,
        );

        log::info!(
            "Tunnel scene created: {} tube vertices, {} stars, {} labels",
            tube.vertices.len(),
            stars.positions.len(),
            labels.len()
        );

        Ok(Self {
            tube,
            stars,
            labels,
            atlas,
        })
    }
}
