use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self { eye, target }
    }

    pub fn is_finite(&self) -> bool {
        self.eye.is_finite() && self.target.is_finite()
    }

    /// Unit view direction, or -Z when eye and target coincide
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}

/// Right-handed perspective camera, Y up
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pose: CameraPose,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
            pose: CameraPose::default(),
        };
        camera.set_aspect(aspect);
        camera
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    /// Ignores zero, negative and non-finite ratios
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.pose.eye
    }

    /// World up, swapped for Z when looking straight up or down
    fn up_hint(&self) -> Vec3 {
        if self.pose.forward().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    pub fn right(&self) -> Vec3 {
        self.pose.forward().cross(self.up_hint()).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.pose.forward())
    }

    pub fn view(&self) -> Mat4 {
        let eye = self.pose.eye;
        Mat4::look_at_rh(eye, eye + self.pose.forward(), self.up_hint())
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
