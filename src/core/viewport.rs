/// Window client area in physical pixels plus the platform scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Scale factor clamped to `max_ratio`; bogus factors count as 1
    pub fn pixel_ratio(&self, max_ratio: f64) -> f64 {
        let scale = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        scale.min(max_ratio.max(1.0))
    }

    /// Render target size once the pixel ratio is clamped
    pub fn surface_size(&self, max_ratio: f64) -> (u32, u32) {
        if self.is_empty() {
            return (0, 0);
        }
        let scale = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        let factor = self.pixel_ratio(max_ratio) / scale;
        let dim = |d: u32| ((f64::from(d) * factor).round() as u32).max(1);
        (dim(self.width), dim(self.height))
    }
}
