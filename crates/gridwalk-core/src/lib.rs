//! Core types, math, and error handling for the gridwalk voxel tracer.
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Rays and their traversal pre-processing
//! - Integer grid coordinates and axes
//! - Axis-aligned bounds and float helpers
//! - The workspace error type

pub mod coords;
pub mod error;
pub mod math;

pub use coords::{Axis, GridCoord};
pub use error::{Error, Result};
pub use math::{Aabb, Ray};

/// Workspace-wide constants
pub mod constants {
    /// Magnitude substituted for zero direction components before stepping.
    ///
    /// Keeps the per-axis inverse direction finite for axis-aligned rays.
    pub const DIRECTION_EPSILON: f32 = 1e-5;
    /// Default scale sequence, coarsest first (world units per cell).
    pub const DEFAULT_SCALES: [u32; 3] = [64, 8, 1];
    /// Default iteration budget for coarse levels.
    pub const COARSE_MAX_STEPS: u32 = 20;
    /// Default iteration budget for the finest level.
    pub const FINE_MAX_STEPS: u32 = 23;
}
