use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::config::FlightConfig;
use crate::path::{wrap_unit, TunnelPath};

/// Progress this close to 1 counts as the end of the path
pub const COMPLETION_EPSILON: f64 = 1e-9;

/// How a tick turns into progress steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramePacing {
    /// One step per displayed frame regardless of refresh rate
    #[default]
    Fixed,
    /// Steps scaled by elapsed time against a reference frame rate
    Elapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Idle,
    Active,
    Completed,
}

/// Result of advancing the controller by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightStep {
    /// Progress moved; the camera should take this pose
    Moved(CameraPose),
    /// The end of the path was reached while active. Reported once.
    Completed,
    /// Already completed; nothing moved
    Halted,
}

/// Owns the camera progress along the path
#[derive(Debug, Clone)]
pub struct FlightController {
    path: TunnelPath,
    config: FlightConfig,
    progress: f64,
    state: FlightState,
    pose: CameraPose,
}

impl FlightController {
    pub fn new(path: TunnelPath, config: FlightConfig) -> Self {
        let mut controller = Self {
            path,
            config,
            progress: 0.0,
            state: FlightState::Idle,
            pose: CameraPose::default(),
        };
        controller.update_pose();
        controller
    }

    /// Start somewhere other than the beginning of the path
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = wrap_progress(progress);
        self.update_pose();
        self
    }

    pub fn path(&self) -> &TunnelPath {
        &self.path
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_completed(&self) -> bool {
        self.state == FlightState::Completed
    }

    /// Progress added per frame for the given activity
    pub fn speed(&self, active: bool) -> f64 {
        if active {
            self.config.idle_speed * self.config.flight_multiplier
        } else {
            self.config.idle_speed
        }
    }

    /// Advance one tick that took `delta` seconds, paced per the config
    ///
    /// `completes` decides what an active flight does at the end of the path:
    /// stop with [`FlightStep::Completed`], or wrap around and keep flying.
    pub fn advance(&mut self, active: bool, completes: bool, delta: f32) -> FlightStep {
        let frames = match self.config.pacing {
            FramePacing::Fixed => 1.0,
            FramePacing::Elapsed => f64::from(delta) * f64::from(self.config.reference_hz),
        };
        self.advance_frames(active, completes, frames)
    }

    /// Advance by a (possibly fractional) number of frames
    pub fn advance_frames(&mut self, active: bool, completes: bool, frames: f64) -> FlightStep {
        if self.state == FlightState::Completed {
            return FlightStep::Halted;
        }

        let frames = sanitize_frames(frames, f64::from(self.config.max_frame_steps));
        self.state = if active {
            FlightState::Active
        } else {
            FlightState::Idle
        };
        self.progress += self.speed(active) * frames;

        if self.progress >= 1.0 - COMPLETION_EPSILON {
            if active && completes {
                self.state = FlightState::Completed;
                log::info!("Flight reached the end of the path");
                return FlightStep::Completed;
            }
            self.progress = wrap_progress(self.progress);
        }

        self.update_pose();
        FlightStep::Moved(self.pose)
    }

    /// Back to the start of the path, idling
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.state = FlightState::Idle;
        self.update_pose();
    }

    fn update_pose(&mut self) {
        let t = self.progress as f32;
        let ahead = wrap_unit(t + self.config.look_ahead);
        let pose = CameraPose::new(self.path.point_at(t), self.path.point_at(ahead));

        if pose.is_finite() {
            self.pose = pose;
        } else {
            log::warn!("Non-finite camera pose at progress {}, keeping previous", self.progress);
        }
    }
}

/// Wrap into [0, 1), snapping values within the completion tolerance of 1 to 0
pub fn wrap_progress(progress: f64) -> f64 {
    if !progress.is_finite() {
        return 0.0;
    }
    let wrapped = progress.rem_euclid(1.0);
    if wrapped >= 1.0 - COMPLETION_EPSILON {
        0.0
    } else {
        wrapped
    }
}

/// Non-finite counts as one frame, negative as none, and runaway ticks are capped
pub fn sanitize_frames(frames: f64, max_frames: f64) -> f64 {
    if !frames.is_finite() {
        return 1.0_f64.min(max_frames.max(0.0));
    }
    frames.clamp(0.0, max_frames.max(0.0))
}
