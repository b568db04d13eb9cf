//! Test harness for the gridwalk voxel tracer.
//!
//! Provides headless rendering and visual regression testing.

pub mod harness;

use std::path::PathBuf;

pub use harness::{create_test_camera, HeadlessRenderer, VisualRegressionTest};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("Configuration error: {0}")]
    Config(#[from] gridwalk_core::Error),
    #[error("Image comparison failed: {0}")]
    ImageComparison(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TestError>;

/// Visual regression test configuration.
#[derive(Debug, Clone)]
pub struct VisualTestConfig {
    /// Maximum allowed normalized pixel difference (0.0-1.0).
    pub threshold: f64,
    /// Directory for baseline images.
    pub baseline_dir: PathBuf,
    /// Directory for test output and diff images.
    pub output_dir: PathBuf,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            baseline_dir: PathBuf::from("assets/test_data/baselines"),
            output_dir: PathBuf::from("target/test_output"),
        }
    }
}
