use glam::Vec3;

use crate::error::{Result, TunnelError};

pub const MIN_CONTROL_POINTS: usize = 4;
pub const DEFAULT_TENSION: f32 = 0.5;
pub const DEFAULT_ARC_DIVISIONS: usize = 200;

/// Closed Catmull-Rom spline the camera flies along.
///
/// The curve passes through every control point and joins the last point back to the
/// first, so `t = 1` lands on the same position as `t = 0`. `point_at`/`tangent_at` are
/// parameterized by arc length: equal steps in `t` cover equal distances, which keeps the
/// camera speed steady across long and short segments. The raw spline parameter is
/// available through `point`/`derivative`.
#[derive(Debug, Clone)]
pub struct TunnelPath {
    points: Vec<Vec3>,
    tension: f32,
    /// Cumulative length at each of `divisions + 1` evenly spaced raw parameters
    arc_lengths: Vec<f32>,
}

impl TunnelPath {
    pub fn new(points: Vec<Vec3>, tension: f32) -> Result<Self> {
        Self::with_divisions(points, tension, DEFAULT_ARC_DIVISIONS)
    }

    pub fn with_divisions(points: Vec<Vec3>, tension: f32, divisions: usize) -> Result<Self> {
        if points.len() < MIN_CONTROL_POINTS {
            return Err(TunnelError::TooFewControlPoints(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TunnelError::NonFiniteControlPoint { index });
        }
        if !tension.is_finite() {
            return Err(TunnelError::InvalidConfig(format!(
                "path tension must be finite, got {tension}"
            )));
        }

        let mut path = Self {
            points,
            tension,
            arc_lengths: Vec::new(),
        };
        path.arc_lengths = path.measure(divisions.max(1));
        Ok(path)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total length of the closed loop
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    pub fn segment_count(&self) -> usize {
        self.points.len()
    }

    /// Position at arc-length fraction `t`, wrapping outside [0, 1)
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.point(self.arc_to_param(t))
    }

    /// Tangent at arc-length fraction `t`; not normalized
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        self.derivative(self.arc_to_param(t))
    }

    /// Position at raw spline parameter `u`, wrapping outside [0, 1)
    pub fn point(&self, u: f32) -> Vec3 {
        let (p0, p1, p2, p3, w) = self.segment(u);
        let m1 = (p2 - p0) * self.tension;
        let m2 = (p3 - p1) * self.tension;

        let w2 = w * w;
        let w3 = w2 * w;

        let h00 = 2.0 * w3 - 3.0 * w2 + 1.0;
        let h10 = w3 - 2.0 * w2 + w;
        let h01 = -2.0 * w3 + 3.0 * w2;
        let h11 = w3 - w2;

        p1 * h00 + m1 * h10 + p2 * h01 + m2 * h11
    }

    /// d(point)/du at raw spline parameter `u`
    pub fn derivative(&self, u: f32) -> Vec3 {
        let (p0, p1, p2, p3, w) = self.segment(u);
        let m1 = (p2 - p0) * self.tension;
        let m2 = (p3 - p1) * self.tension;

        let w2 = w * w;

        let d00 = 6.0 * w2 - 6.0 * w;
        let d10 = 3.0 * w2 - 4.0 * w + 1.0;
        let d01 = -6.0 * w2 + 6.0 * w;
        let d11 = 3.0 * w2 - 2.0 * w;

        // Chain rule: each segment spans 1/n of u
        (p1 * d00 + m1 * d10 + p2 * d01 + m2 * d11) * self.points.len() as f32
    }

    /// Map an arc-length fraction to the raw spline parameter
    pub fn arc_to_param(&self, t: f32) -> f32 {
        let t = wrap_unit(t);
        let divisions = self.arc_lengths.len() - 1;
        let total = self.length();
        if total <= f32::EPSILON {
            return t;
        }

        let target = t * total;
        // Last index whose cumulative length does not exceed the target
        let i = match self
            .arc_lengths
            .binary_search_by(|len| len.total_cmp(&target))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
        .min(divisions - 1);

        let before = self.arc_lengths[i];
        let span = self.arc_lengths[i + 1] - before;
        let fraction = if span > 0.0 {
            ((target - before) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        (i as f32 + fraction) / divisions as f32
    }

    fn measure(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut total = 0.0;
        let mut last = self.point(0.0);
        lengths.push(0.0);

        for step in 1..=divisions {
            let current = self.point(step as f32 / divisions as f32);
            total += current.distance(last);
            lengths.push(total);
            last = current;
        }

        lengths
    }

    /// Control points surrounding `u` plus the local weight within the segment
    fn segment(&self, u: f32) -> (Vec3, Vec3, Vec3, Vec3, f32) {
        let n = self.points.len();
        let scaled = wrap_unit(u) * n as f32;
        let i = (scaled.floor() as usize).min(n - 1);
        let w = (scaled - i as f32).clamp(0.0, 1.0);

        (
            self.points[(i + n - 1) % n],
            self.points[i],
            self.points[(i + 1) % n],
            self.points[(i + 2) % n],
            w,
        )
    }
}

/// Wrap into [0, 1); non-finite input maps to 0
pub fn wrap_unit(t: f32) -> f32 {
    if !t.is_finite() {
        return 0.0;
    }
    let wrapped = t.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
