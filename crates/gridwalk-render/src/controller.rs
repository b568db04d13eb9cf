//! Free-flying camera control.
//!
//! The controller collects movement and pointer input between frames and
//! applies it to a [`Camera`] once per time step. It does not know about
//! windows or key codes; hosts translate their input events into
//! [`Movement`] and pointer deltas.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Speed multiplier while sprinting.
const SPRINT_MULTIPLIER: f32 = 2.5;

/// Pitch stays this far from straight up or down.
const PITCH_MARGIN: f32 = 0.01;

/// A held movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Yaw/pitch fly camera controller.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraController {
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Rotation in radians per unit of pointer delta.
    pub sensitivity: f32,
    /// Rotation around the Y axis in radians, 0 looking down +Z.
    yaw: f32,
    /// Rotation around the camera's right axis in radians, positive looking down.
    pitch: f32,
    held: [bool; 6],
    sprint: bool,
    rotate_horizontal: f32,
    rotate_vertical: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            yaw: 0.0,
            pitch: 0.0,
            held: [false; 6],
            sprint: false,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
        }
    }

    /// Controller whose yaw and pitch match the camera's current direction.
    pub fn from_camera(camera: &Camera, speed: f32, sensitivity: f32) -> Self {
        let dir = camera.direction.normalize_or_zero();
        Self {
            yaw: dir.x.atan2(dir.z),
            pitch: (-dir.y).clamp(-1.0, 1.0).asin(),
            ..Self::new(speed, sensitivity)
        }
    }

    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Press or release a movement direction.
    pub fn set_movement(&mut self, movement: Movement, pressed: bool) {
        self.held[movement as usize] = pressed;
    }

    pub fn set_sprint(&mut self, sprint: bool) {
        self.sprint = sprint;
    }

    /// Accumulate a pointer delta until the next update.
    pub fn add_rotation(&mut self, dx: f32, dy: f32) {
        self.rotate_horizontal += dx;
        self.rotate_vertical += dy;
    }

    /// Apply pending rotation and `dt` seconds of held movement to `camera`.
    pub fn update_camera(&mut self, camera: &mut Camera, dt: f32) {
        self.yaw -= self.rotate_horizontal * self.sensitivity;
        self.pitch += self.rotate_vertical * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-FRAC_PI_2 + PITCH_MARGIN, FRAC_PI_2 - PITCH_MARGIN);
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        let direction = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            -self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
        .normalize();
        camera.direction = direction;

        let forward = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();

        let mut movement = Vec3::ZERO;
        for (held, axis) in self.held.iter().zip([
            forward,
            -forward,
            -right,
            right,
            Vec3::Y,
            Vec3::NEG_Y,
        ]) {
            if *held {
                movement += axis;
            }
        }

        if movement != Vec3::ZERO {
            let speed = if self.sprint {
                self.speed * SPRINT_MULTIPLIER
            } else {
                self.speed
            };
            camera.position += movement.normalize() * speed * dt;
        }
    }
}
