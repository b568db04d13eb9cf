//! Camera and ray unprojection.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3, Vec4};
use gridwalk_core::{Error, Ray, Result};
use serde::{Deserialize, Serialize};

/// Perspective camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 16.0, 64.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Create a camera at `position` looking at `target`.
    pub fn new(position: Vec3, target: Vec3, fov: f32, aspect: f32) -> Self {
        Self {
            position,
            direction: (target - position).normalize_or_zero(),
            fov,
            aspect,
            ..Self::default()
        }
    }

    /// Camera on a horizontal circle of `radius` around `target`, raised by
    /// `height`, at `angle` radians, looking at `target`.
    pub fn orbit(target: Vec3, radius: f32, height: f32, angle: f32, aspect: f32) -> Self {
        let position = target + Vec3::new(angle.cos() * radius, height, angle.sin() * radius);
        Self::new(position, target, std::f32::consts::FRAC_PI_4, aspect)
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3) {
        self.direction = (target - self.position).normalize_or_zero();
    }

    /// Set the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Check the camera can produce a projection.
    pub fn validate(&self) -> Result<()> {
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "camera aspect must be positive, got {}",
                self.aspect
            )));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(Error::InvalidConfig(format!(
                "camera fov must be in (0, pi), got {}",
                self.fov
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(Error::InvalidConfig(format!(
                "camera clip range {}..{} is invalid",
                self.near, self.far
            )));
        }
        if self.direction.length_squared() == 0.0 || !self.direction.is_finite() {
            return Err(Error::InvalidConfig(
                "camera direction must be non-zero".to_string(),
            ));
        }
        if self.direction.normalize().cross(self.up).length_squared() < 1e-12 {
            return Err(Error::InvalidConfig(
                "camera direction is parallel to up".to_string(),
            ));
        }
        Ok(())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Camera data as consumed by ray generation.
    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms::from(self)
    }

    /// World-space ray through the center of pixel `(x, y)`.
    ///
    /// Prefer [`CameraUniforms::ray_for_pixel`] when generating many rays,
    /// it does not recompute matrix inverses.
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        self.uniforms().ray_for_pixel(x, y, width, height)
    }
}

/// Camera matrices laid out for upload to a GPU host.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
}

impl CameraUniforms {
    /// Unproject a normalized device coordinate into a world-space ray from
    /// the view position.
    ///
    /// `ndc` spans `[-1, 1]` on both axes with `+y` up.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse_projection = Mat4::from_cols_array_2d(&self.inverse_projection);
        let inverse_view = Mat4::from_cols_array_2d(&self.inverse_view);

        // Point on the near plane in view space
        let target = inverse_projection * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let target = target.truncate() / target.w;
        let direction = inverse_view.transform_vector3(target);

        Ray::new(Vec4::from(self.view_position).truncate(), direction)
    }

    /// Ray through the center of pixel `(x, y)`, row 0 at the top.
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let u = (x as f32 + 0.5) / width as f32;
        let v = (y as f32 + 0.5) / height as f32;
        self.ray_from_ndc(Vec2::new(u * 2.0 - 1.0, 1.0 - v * 2.0))
    }
}

impl From<&Camera> for CameraUniforms {
    fn from(camera: &Camera) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        Self {
            view_position: camera.position.extend(1.0).to_array(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            inverse_view: view.inverse().to_cols_array_2d(),
            inverse_projection: projection.inverse().to_cols_array_2d(),
        }
    }
}
