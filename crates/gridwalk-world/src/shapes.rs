//! Closed-form occupancy strategies.
//!
//! Every strategy answers exactly at scale 1 and conservatively above it: a
//! coarse cell reports occupied whenever one of the scale-1 voxels it covers
//! might be.

use std::f32::consts::{FRAC_PI_2, TAU};

use gridwalk_core::{Axis, GridCoord};
use serde::{Deserialize, Serialize};

use crate::oracle::VoxelOracle;

/// A volume with nothing in it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Empty;

impl VoxelOracle for Empty {
    #[inline]
    fn occupied(&self, _cell: GridCoord, _scale: u32) -> bool {
        false
    }
}

/// Solid half-space below `height`: voxel `y < height` is occupied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub height: i32,
}

impl Floor {
    pub const fn new(height: i32) -> Self {
        Self { height }
    }
}

impl VoxelOracle for Floor {
    #[inline]
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        // Lowest scale-1 voxel covered by the cell
        i64::from(cell.y) * i64::from(scale) < i64::from(self.height)
    }
}

/// Periodic terrain: voxel `(x, y, z)` is occupied when
/// `y < base + amplitude * sin(x / period) * sin(z / period)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SineHeightField {
    pub amplitude: f32,
    pub period: f32,
    /// Height the surface oscillates around.
    #[serde(default)]
    pub base: f32,
}

impl Default for SineHeightField {
    fn default() -> Self {
        Self {
            amplitude: 12.0,
            period: 16.0,
            base: 0.0,
        }
    }
}

impl SineHeightField {
    pub const fn new(amplitude: f32, period: f32) -> Self {
        Self {
            amplitude,
            period,
            base: 0.0,
        }
    }

    /// Raise the surface by `base`.
    #[must_use]
    pub const fn with_base(mut self, base: f32) -> Self {
        self.base = base;
        self
    }

    /// Surface height at world column `(x, z)`.
    #[inline]
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.surface((x / self.period).sin(), (z / self.period).sin())
    }

    #[inline]
    fn surface(&self, sin_x: f32, sin_z: f32) -> f32 {
        self.base + self.amplitude * sin_x * sin_z
    }

    /// Range of `sin(c / period)` over the integer columns `c` in
    /// `[lo, lo + span)`.
    fn sine_range(&self, lo: i64, span: i64) -> (f32, f32) {
        let a = lo as f32 / self.period;
        let b = (lo + span - 1) as f32 / self.period;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };

        let (sin_a, sin_b) = (a.sin(), b.sin());
        let mut low = sin_a.min(sin_b);
        let mut high = sin_a.max(sin_b);
        if passes_phase(a, b, FRAC_PI_2) {
            high = 1.0;
        }
        if passes_phase(a, b, -FRAC_PI_2) {
            low = -1.0;
        }
        (low, high)
    }
}

/// Whether `[a, b]` contains an angle `phase + k * TAU`, with some slack.
fn passes_phase(a: f32, b: f32, phase: f32) -> bool {
    const SLACK: f32 = 1e-3;
    let turns = ((a - SLACK - phase) / TAU).ceil();
    phase + turns * TAU <= b + SLACK
}

impl VoxelOracle for SineHeightField {
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        if scale <= 1 {
            return (cell.y as f32) < self.height(cell.x as f32, cell.z as f32);
        }
        // The surface is bilinear in the two sines, so its peak over the
        // covered columns sits at a corner of their ranges
        let span = i64::from(scale);
        let (x_low, x_high) = self.sine_range(i64::from(cell.x) * span, span);
        let (z_low, z_high) = self.sine_range(i64::from(cell.z) * span, span);
        let peak = [x_low, x_high]
            .into_iter()
            .flat_map(|sin_x| [z_low, z_high].map(|sin_z| self.surface(sin_x, sin_z)))
            .fold(f32::NEG_INFINITY, f32::max);
        let lowest_y = (i64::from(cell.y) * span) as f32;
        lowest_y < peak
    }
}

/// Periodic blocks: voxel `(x, y, z)` is occupied when every coordinate
/// modulo `period` is below `size`.
///
/// A `size` of 1 gives isolated points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    pub period: u32,
    pub size: u32,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::points(8)
    }
}

impl Lattice {
    pub const fn new(period: u32, size: u32) -> Self {
        Self { period, size }
    }

    /// Single voxels every `period` cells.
    pub const fn points(period: u32) -> Self {
        Self::new(period, 1)
    }

    /// Whether `[lo, lo + span)` reaches into a block.
    #[inline]
    fn span_hits(&self, lo: i64, span: i64) -> bool {
        let period = i64::from(self.period.max(1));
        let size = i64::from(self.size.min(self.period));
        let offset = lo.rem_euclid(period);
        offset < size || period - offset < span
    }
}

impl VoxelOracle for Lattice {
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        let span = i64::from(scale);
        Axis::ALL
            .iter()
            .all(|&axis| self.span_hits(i64::from(cell.get(axis)) * span, span))
    }
}
