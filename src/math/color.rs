use crate::error::{Result, TunnelError};

/// 8-bit sRGB color as written in config files (`#rrggbb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(TunnelError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| TunnelError::InvalidColor(hex.to_string()))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Channels as sRGB-encoded floats in [0, 1]
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Channels decoded to linear light, for vertex colors written to an sRGB surface
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb_f32().map(srgb_to_linear)
    }

    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accent_colors() {
        assert_eq!(Rgb8::from_hex("#00a3ff").unwrap(), Rgb8::new(0x00, 0xa3, 0xff));
        assert_eq!(Rgb8::from_hex("00ffaa").unwrap(), Rgb8::new(0x00, 0xff, 0xaa));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Rgb8::from_hex("#00a3f").is_err());
        assert!(Rgb8::from_hex("#zzzzzz").is_err());
        assert!(Rgb8::from_hex("").is_err());
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let white = Rgb8::new(255, 255, 255).to_linear();
        let black = Rgb8::new(0, 0, 0).to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-5);
        }
        for c in black {
            assert!(c.abs() < 1e-6);
        }
    }

    #[test]
    fn linear_is_darker_than_srgb_midtones() {
        let mid = srgb_to_linear(0.5);
        assert!(mid < 0.5);
        assert!((mid - 0.214).abs() < 0.01);
    }
}
