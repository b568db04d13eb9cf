//! Parallel CPU frame rendering.
//!
//! One ray is traced per pixel. Rows are rendered as independent parallel
//! chunks of the output buffer, so no pixel is written by two threads and
//! nothing is shared between rays except the camera and the oracle.

use std::ops::Add;

use glam::Vec3;
use gridwalk_core::{Error, Result};
use gridwalk_voxel::{traverse, StepOutcome, TraversalLevels};
use gridwalk_world::VoxelOracle;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::shading::{shade, to_rgba8, ShadingMode};

/// Share of budget-exhausted rays above which a frame is reported.
const EXHAUSTED_WARN_RATIO: f64 = 0.25;

/// Output settings for a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub shading: ShadingMode,
    /// Flat miss color, the sky gradient when `None`.
    pub background: Option<Vec3>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            shading: ShadingMode::default(),
            background: None,
        }
    }
}

impl RenderConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_background(mut self, background: Vec3) -> Self {
        self.background = Some(background);
        self
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Traversal outcome counts for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rays: u64,
    pub hits: u64,
    pub chunk_exits: u64,
    pub budget_exhausted: u64,
    /// Iterations summed over every ray.
    pub total_steps: u64,
    /// Most iterations spent on a single ray.
    pub max_steps: u32,
}

impl FrameStats {
    fn record(&mut self, outcome: StepOutcome, steps: u32) {
        self.rays += 1;
        match outcome {
            StepOutcome::Hit => self.hits += 1,
            StepOutcome::ChunkExit => self.chunk_exits += 1,
            StepOutcome::BudgetExhausted => self.budget_exhausted += 1,
        }
        self.total_steps += u64::from(steps);
        self.max_steps = self.max_steps.max(steps);
    }

    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.rays)
    }

    pub fn exhausted_ratio(&self) -> f64 {
        ratio(self.budget_exhausted, self.rays)
    }

    pub fn mean_steps(&self) -> f64 {
        ratio(self.total_steps, self.rays)
    }
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl Add for FrameStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            rays: self.rays + other.rays,
            hits: self.hits + other.hits,
            chunk_exits: self.chunk_exits + other.chunk_exits,
            budget_exhausted: self.budget_exhausted + other.budget_exhausted,
            total_steps: self.total_steps + other.total_steps,
            max_steps: self.max_steps.max(other.max_steps),
        }
    }
}

/// A rendered RGBA8 image with its statistics.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, top row first.
    pub pixels: Vec<u8>,
    pub stats: FrameStats,
}

impl Frame {
    /// RGBA of pixel `(x, y)`, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[i..i + 4]);
        Some(rgba)
    }
}

/// Traces frames on the CPU with rayon.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: RenderConfig,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_shading(&mut self, shading: ShadingMode) {
        self.config.shading = shading;
    }

    /// Render one frame of `oracle` seen through `camera`.
    ///
    /// The camera's aspect ratio is used as is; keep it in sync with the
    /// configured frame size.
    pub fn render<O: VoxelOracle + ?Sized>(
        &self,
        camera: &Camera,
        oracle: &O,
        levels: &TraversalLevels,
    ) -> Frame {
        let RenderConfig {
            width,
            height,
            shading,
            background,
        } = self.config;
        let uniforms = camera.uniforms();
        let max_steps = u32::try_from(levels.max_total_steps()).unwrap_or(u32::MAX);

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        let stats = pixels
            .par_chunks_mut(width as usize * 4)
            .enumerate()
            .map(|(y, row)| {
                let mut stats = FrameStats::default();
                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let ray = uniforms.ray_for_pixel(x as u32, y as u32, width, height);
                    let result = traverse(&ray, levels, oracle);
                    stats.record(result.outcome, result.steps);
                    let color = shade(&result, &ray, shading, max_steps, background);
                    pixel.copy_from_slice(&to_rgba8(color));
                }
                stats
            })
            .reduce(FrameStats::default, Add::add);

        debug!(
            rays = stats.rays,
            hits = stats.hits,
            chunk_exits = stats.chunk_exits,
            budget_exhausted = stats.budget_exhausted,
            mean_steps = stats.mean_steps(),
            max_steps = stats.max_steps,
            "Frame traced"
        );
        if stats.exhausted_ratio() > EXHAUSTED_WARN_RATIO {
            warn!(
                "{:.0}% of rays exhausted their step budget; consider larger budgets",
                stats.exhausted_ratio() * 100.0
            );
        }

        Frame {
            width,
            height,
            pixels,
            stats,
        }
    }
}
