use font8x8::legacy::BASIC_LEGACY;
use glam::Vec3;
use rand::Rng;

use crate::config::LabelConfig;
use crate::math::Rgb8;
use crate::path::TunnelPath;

const GLYPH_SIZE: u32 = 8;
/// 8px glyphs drawn at 24px, a bold-ish monospace look
const GLYPH_SCALE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accent {
    A,
    B,
}

impl Accent {
    pub fn index(self) -> usize {
        match self {
            Accent::A => 0,
            Accent::B => 1,
        }
    }

    pub fn pick(self, accents: (Rgb8, Rgb8)) -> Rgb8 {
        match self {
            Accent::A => accents.0,
            Accent::B => accents.1,
        }
    }
}

/// A text billboard floating near the path
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSprite {
    /// Index into the vocabulary
    pub token: usize,
    pub accent: Accent,
    pub position: Vec3,
    pub size: [f32; 2],
}

/// RGBA8 (sRGB) texture holding one rasterized label
#[derive(Debug, Clone)]
pub struct LabelTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LabelTexture {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}

/// Every (token, accent) texture stacked vertically, one row each
#[derive(Debug, Clone)]
pub struct LabelAtlas {
    pub texture: LabelTexture,
    pub rows: usize,
    row_height: u32,
}

impl LabelAtlas {
    pub fn build(vocabulary: &[String], accents: (Rgb8, Rgb8), width: u32, height: u32) -> Self {
        let rows = vocabulary.len() * 2;
        let mut pixels = Vec::with_capacity((width * height) as usize * 4 * rows);

        for text in vocabulary {
            for accent in [Accent::A, Accent::B] {
                let label = rasterize_label(text, accent.pick(accents), width, height);
                pixels.extend_from_slice(&label.pixels);
            }
        }

        Self {
            texture: LabelTexture {
                width,
                height: height * rows.max(1) as u32,
                pixels,
            },
            rows,
            row_height: height,
        }
    }

    pub fn row(token: usize, accent: Accent) -> usize {
        token * 2 + accent.index()
    }

    /// Normalized [top, bottom] texture coordinates of a sprite's row
    pub fn uv_rows(&self, sprite: &LabelSprite) -> [f32; 2] {
        let row = Self::row(sprite.token, sprite.accent) as f32;
        let rows = self.rows.max(1) as f32;
        [row / rows, (row + 1.0) / rows]
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }
}

/// Draw `text` left-aligned with its baseline at 5/8 of the height, transparent elsewhere
pub fn rasterize_label(text: &str, color: Rgb8, width: u32, height: u32) -> LabelTexture {
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    let ink = color.to_rgba(255);

    let glyph_px = GLYPH_SIZE * GLYPH_SCALE;
    let top = (height * 5 / 8).saturating_sub(glyph_px);

    for (col, ch) in text.chars().enumerate() {
        let left = col as u32 * glyph_px;
        if left >= width {
            break;
        }

        for (row, bits) in glyph_for_char(ch).iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                if (bits >> bit) & 0x01 == 0 {
                    continue;
                }
                for sy in 0..GLYPH_SCALE {
                    for sx in 0..GLYPH_SCALE {
                        let x = left + bit * GLYPH_SCALE + sx;
                        let y = top + row as u32 * GLYPH_SCALE + sy;
                        if x >= width || y >= height {
                            continue;
                        }
                        let idx = ((y * width + x) * 4) as usize;
                        pixels[idx..idx + 4].copy_from_slice(&ink);
                    }
                }
            }
        }
    }

    LabelTexture {
        width,
        height,
        pixels,
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Scatter `config.count` labels around random points of the path
pub fn build_labels<R: Rng + ?Sized>(
    path: &TunnelPath,
    config: &LabelConfig,
    rng: &mut R,
) -> Vec<LabelSprite> {
    if config.vocabulary.is_empty() {
        return Vec::new();
    }

    let half = config.jitter * 0.5;
    let jitter = |rng: &mut R| {
        if half > 0.0 {
            rng.gen_range(-half..half)
        } else {
            0.0
        }
    };

    (0..config.count)
        .map(|_| {
            let token = rng.gen_range(0..config.vocabulary.len());
            let accent = if rng.gen_bool(0.5) { Accent::B } else { Accent::A };
            let anchor = path.point_at(rng.gen::<f32>());
            let offset = Vec3::new(jitter(rng), jitter(rng), jitter(rng));

            LabelSprite {
                token,
                accent,
                position: anchor + offset,
                size: config.world_size,
            }
        })
        .collect()
}
