// config.rs - Tunnel configuration, loaded from JSON with defaults for every field
use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::core::FramePacing;
use crate::error::{Result, TunnelError};
use crate::math::Rgb8;
use crate::path::{TunnelPath, DEFAULT_ARC_DIVISIONS, DEFAULT_TENSION};

pub const ACCENT_A: &str = "#00a3ff";
pub const ACCENT_B: &str = "#00ffaa";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunnelConfig {
    /// Seed for star and label placement; random when absent
    pub seed: Option<u64>,
    pub path: PathConfig,
    pub tube: TubeConfig,
    pub stars: StarConfig,
    pub labels: LabelConfig,
    pub flight: FlightConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub control_points: Vec<[f32; 3]>,
    pub tension: f32,
    pub arc_divisions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TubeConfig {
    pub tubular_segments: usize,
    pub radial_segments: usize,
    pub radius: f32,
    /// Color of even-indexed vertices
    pub accent_a: String,
    /// Color of odd-indexed vertices
    pub accent_b: String,
    pub opacity: f32,
    /// Rotation about Z added every rendered frame, radians
    pub spin_per_frame: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarConfig {
    pub count: usize,
    pub half_extent: f32,
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub count: usize,
    pub vocabulary: Vec<String>,
    /// Full width of the placement jitter on each axis
    pub jitter: f32,
    pub world_size: [f32; 2],
    pub opacity: f32,
    pub texture_width: u32,
    pub texture_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlightConfig {
    pub idle_speed: f64,
    pub flight_multiplier: f64,
    /// Progress offset of the look-at sample
    pub look_ahead: f32,
    pub pacing: FramePacing,
    /// Frame rate the speeds are tuned for when pacing by elapsed time
    pub reference_hz: f32,
    /// Upper bound on frames advanced in a single tick
    pub max_frame_steps: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Exponential-squared fog density; 0 disables fog
    pub fog_density: f32,
    pub max_pixel_ratio: f64,
    pub background: String,
    /// Scene brightness while not flying; flying is always full strength
    pub idle_intensity: f32,
    /// Seconds to fade between idle and flying intensity
    pub fade_seconds: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Time spent in the tunnel view before the selection view appears
    pub travel_seconds: f32,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            seed: None,
            path: PathConfig::default(),
            tube: TubeConfig::default(),
            stars: StarConfig::default(),
            labels: LabelConfig::default(),
            flight: FlightConfig::default(),
            camera: CameraConfig::default(),
            render: RenderConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            control_points: vec![
                [0.0, 0.0, 0.0],
                [20.0, 10.0, -50.0],
                [40.0, -10.0, -100.0],
                [60.0, 15.0, -150.0],
                [50.0, -5.0, -200.0],
                [0.0, 0.0, -250.0],
                [-100.0, 0.0, -200.0],
                [-150.0, 0.0, -100.0],
                [-100.0, 0.0, 0.0],
                [-50.0, 10.0, 100.0],
                [-20.0, -10.0, 150.0],
                [0.0, 0.0, 200.0],
            ],
            tension: DEFAULT_TENSION,
            arc_divisions: DEFAULT_ARC_DIVISIONS,
        }
    }
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            tubular_segments: 400,
            radial_segments: 12,
            radius: 4.0,
            accent_a: ACCENT_A.to_string(),
            accent_b: ACCENT_B.to_string(),
            opacity: 0.3,
            spin_per_frame: 0.001,
        }
    }
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 1500,
            half_extent: 400.0,
            size: 1.5,
            opacity: 0.6,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            count: 50,
            vocabulary: ["<div>", "const x", "import", "return", "010101", "ERROR", "NULL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            jitter: 100.0,
            world_size: [20.0, 5.0],
            opacity: 0.7,
            texture_width: 256,
            texture_height: 64,
        }
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            idle_speed: 0.0005,
            flight_multiplier: 4.0,
            look_ahead: 0.01,
            pacing: FramePacing::Fixed,
            reference_hz: 60.0,
            max_frame_steps: 4.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fog_density: 0.005,
            max_pixel_ratio: 2.0,
            background: "#000000".to_string(),
            idle_intensity: 0.4,
            fade_seconds: 1.0,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { travel_seconds: 2.5 }
    }
}

impl TunnelConfig {
    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Path preconditions live in TunnelPath::new; building it is the check
        self.build_path()?;
        self.accents()?;
        Rgb8::from_hex(&self.render.background)?;

        let tube = &self.tube;
        require(tube.tubular_segments >= 1, "tube.tubular_segments must be at least 1")?;
        require(tube.radial_segments >= 3, "tube.radial_segments must be at least 3")?;
        require(positive(tube.radius), "tube.radius must be positive")?;
        require(unit(tube.opacity), "tube.opacity must be within [0, 1]")?;
        require(tube.spin_per_frame.is_finite(), "tube.spin_per_frame must be finite")?;

        require(positive(self.stars.half_extent), "stars.half_extent must be positive")?;
        require(positive(self.stars.size), "stars.size must be positive")?;
        require(unit(self.stars.opacity), "stars.opacity must be within [0, 1]")?;

        let labels = &self.labels;
        require(
            labels.count == 0 || !labels.vocabulary.is_empty(),
            "labels.vocabulary must not be empty",
        )?;
        require(
            labels.jitter.is_finite() && labels.jitter >= 0.0,
            "labels.jitter must be non-negative",
        )?;
        require(
            positive(labels.world_size[0]) && positive(labels.world_size[1]),
            "labels.world_size must be positive",
        )?;
        require(unit(labels.opacity), "labels.opacity must be within [0, 1]")?;
        require(
            labels.texture_width > 0 && labels.texture_height > 0,
            "labels texture size must be non-zero",
        )?;

        let flight = &self.flight;
        require(
            flight.idle_speed.is_finite() && flight.idle_speed > 0.0 && flight.idle_speed < 1.0,
            "flight.idle_speed must be within (0, 1)",
        )?;
        require(
            flight.flight_multiplier.is_finite() && flight.flight_multiplier >= 1.0,
            "flight.flight_multiplier must be at least 1",
        )?;
        require(
            flight.look_ahead.is_finite() && flight.look_ahead > 0.0 && flight.look_ahead < 1.0,
            "flight.look_ahead must be within (0, 1)",
        )?;
        require(positive(flight.reference_hz), "flight.reference_hz must be positive")?;
        require(
            flight.max_frame_steps.is_finite() && flight.max_frame_steps >= 1.0,
            "flight.max_frame_steps must be at least 1",
        )?;

        let camera = &self.camera;
        require(
            camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0,
            "camera.fov_degrees must be within (0, 180)",
        )?;
        require(
            positive(camera.near) && camera.far > camera.near,
            "camera clip planes must satisfy 0 < near < far",
        )?;

        require(
            self.render.fog_density.is_finite() && self.render.fog_density >= 0.0,
            "render.fog_density must be non-negative",
        )?;
        require(
            self.render.max_pixel_ratio.is_finite() && self.render.max_pixel_ratio > 0.0,
            "render.max_pixel_ratio must be positive",
        )?;
        require(
            unit(self.render.idle_intensity),
            "render.idle_intensity must be within [0, 1]",
        )?;
        require(
            self.render.fade_seconds.is_finite() && self.render.fade_seconds >= 0.0,
            "render.fade_seconds must be non-negative",
        )?;
        require(
            self.view.travel_seconds.is_finite() && self.view.travel_seconds >= 0.0,
            "view.travel_seconds must be non-negative",
        )?;

        Ok(())
    }

    pub fn build_path(&self) -> Result<TunnelPath> {
        let points = self
            .path
            .control_points
            .iter()
            .map(|p| Vec3::from_array(*p))
            .collect();
        TunnelPath::with_divisions(points, self.path.tension, self.path.arc_divisions)
    }

    /// Random source for scene placement; seeded runs are reproducible
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Accent colors (A, B)
    pub fn accents(&self) -> Result<(Rgb8, Rgb8)> {
        Ok((
            Rgb8::from_hex(&self.tube.accent_a)?,
            Rgb8::from_hex(&self.tube.accent_b)?,
        ))
    }
}

fn require(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(TunnelError::InvalidConfig(message.to_string()))
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn unit(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        TunnelConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = TunnelConfig::from_json("{}").unwrap();
        assert_eq!(config, TunnelConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            TunnelConfig::from_json(r#"{ "seed": 7, "flight": { "idle_speed": 0.001 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.flight.idle_speed, 0.001);
        assert_eq!(config.flight.flight_multiplier, 4.0);
        assert_eq!(config.stars.count, 1500);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(TunnelConfig::from_json(r#"{ "flight": { "warp": 9 } }"#).is_err());
    }

    #[test]
    fn short_path_is_rejected() {
        let err = TunnelConfig::from_json(
            r#"{ "path": { "control_points": [[0,0,0],[1,0,0],[0,1,0]] } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("4 control points"));
    }

    #[test]
    fn bad_accent_is_rejected() {
        let mut config = TunnelConfig::default();
        config.tube.accent_b = "teal".to_string();
        assert!(matches!(config.validate(), Err(TunnelError::InvalidColor(_))));
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let mut config = TunnelConfig::default();
        config.flight.idle_speed = 0.0;
        assert!(matches!(config.validate(), Err(TunnelError::InvalidConfig(_))));
    }

    #[test]
    fn pacing_parses_lowercase() {
        let config = TunnelConfig::from_json(r#"{ "flight": { "pacing": "elapsed" } }"#).unwrap();
        assert_eq!(config.flight.pacing, FramePacing::Elapsed);
    }

    #[test]
    fn idle_intensity_must_be_a_fraction() {
        let mut config = TunnelConfig::default();
        assert_eq!(config.render.idle_intensity, 0.4);
        config.render.idle_intensity = 1.5;
        assert!(matches!(config.validate(), Err(TunnelError::InvalidConfig(_))));
    }
}
