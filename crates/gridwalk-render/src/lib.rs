//! Frame rendering for the gridwalk voxel tracer.
//!
//! This crate provides:
//! - Camera and ray unprojection
//! - A windowless fly-camera controller
//! - Shading modes, including traversal diagnostics
//! - A parallel CPU frame renderer with per-frame statistics
//! - Screenshot output

pub mod camera;
pub mod controller;
pub mod frame;
pub mod screenshot;
pub mod shading;

pub use camera::{Camera, CameraUniforms};
pub use controller::{CameraController, Movement};
pub use frame::{Frame, FrameRenderer, FrameStats, RenderConfig};
pub use screenshot::{
    parse_frame_indices, save_frame, save_screenshot, ScreenshotConfig, ScreenshotError,
};
pub use shading::{shade, sky_color, ShadingMode};
