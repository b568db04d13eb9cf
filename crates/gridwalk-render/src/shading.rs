//! Mapping traversal results to pixel colors.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use gridwalk_core::{Axis, Error, Ray};
use gridwalk_voxel::{StepOutcome, TraversalResult};
use serde::{Deserialize, Serialize};

/// World units over which position colors repeat.
const POSITION_PERIOD: f32 = 64.0;

/// How a traversal result is turned into a color.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadingMode {
    /// Hit position encoded as RGB.
    #[default]
    Position = 0,
    /// Flat shading by the axis of the face the ray entered through.
    FaceAxis = 1,
    /// Heatmap of traversal iterations per pixel.
    TraversalSteps = 2,
    /// Hits, chunk exits and exhausted budgets in distinct colors.
    Outcome = 3,
}

impl ShadingMode {
    pub const ALL: [Self; 4] = [
        Self::Position,
        Self::FaceAxis,
        Self::TraversalSteps,
        Self::Outcome,
    ];

    /// Cycle to the next shading mode.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Position => Self::FaceAxis,
            Self::FaceAxis => Self::TraversalSteps,
            Self::TraversalSteps => Self::Outcome,
            Self::Outcome => Self::Position,
        }
    }

    /// Get the mode as a u32 for GPU push constants.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::FaceAxis => "face-axis",
            Self::TraversalSteps => "steps",
            Self::Outcome => "outcome",
        }
    }

    /// Diagnostic modes color misses instead of drawing the sky.
    pub const fn is_diagnostic(self) -> bool {
        matches!(self, Self::TraversalSteps | Self::Outcome)
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShadingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| Error::InvalidData(format!("unknown shading mode '{s}'")))
    }
}

/// Vertical gradient from white at the horizon to light blue overhead.
pub fn sky_color(ray: &Ray) -> Vec3 {
    let t = 0.5 * (ray.direction.y + 1.0);
    (1.0 - t) * Vec3::ONE + t * Vec3::new(0.5, 0.7, 1.0)
}

/// Blue to red through green.
fn heatmap(t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        Vec3::new(0.0, 0.0, 1.0).lerp(Vec3::new(0.0, 1.0, 0.0), t * 2.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0).lerp(Vec3::new(1.0, 0.0, 0.0), (t - 0.5) * 2.0)
    }
}

fn face_shade(axis: Option<Axis>) -> f32 {
    match axis {
        Some(Axis::Y) | None => 1.0,
        Some(Axis::X) => 0.8,
        Some(Axis::Z) => 0.6,
    }
}

/// Color for one pixel in linear `[0, 1]` RGB.
///
/// `max_steps` normalizes the step heatmap; `background` replaces the sky for
/// misses in non-diagnostic modes.
pub fn shade(
    result: &TraversalResult,
    ray: &Ray,
    mode: ShadingMode,
    max_steps: u32,
    background: Option<Vec3>,
) -> Vec3 {
    match mode {
        ShadingMode::TraversalSteps => {
            return heatmap(result.steps as f32 / max_steps.max(1) as f32);
        }
        ShadingMode::Outcome => {
            return match result.outcome {
                StepOutcome::Hit => Vec3::new(0.2, 0.8, 0.2),
                StepOutcome::ChunkExit => Vec3::new(1.0, 0.75, 0.1),
                StepOutcome::BudgetExhausted => Vec3::new(0.9, 0.1, 0.1),
            };
        }
        ShadingMode::Position | ShadingMode::FaceAxis => {}
    }

    if !result.is_hit() {
        return background.unwrap_or_else(|| sky_color(ray));
    }

    match mode {
        ShadingMode::FaceAxis => Vec3::new(0.55, 0.62, 0.5) * face_shade(result.face_axis),
        _ => result.position.rem_euclid(Vec3::splat(POSITION_PERIOD)) / POSITION_PERIOD,
    }
}

/// Quantize a linear color to RGBA8.
#[inline]
pub fn to_rgba8(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::IVec3;
    use gridwalk_core::GridCoord;

    fn result(outcome: StepOutcome, position: Vec3, steps: u32) -> TraversalResult {
        TraversalResult {
            outcome,
            position,
            cell: GridCoord::containing(position, 1),
            scale: 1,
            level: 2,
            face_axis: Some(Axis::X),
            face_normal: IVec3::NEG_X,
            steps,
        }
    }

    #[test]
    fn mode_cycle_visits_all() {
        let mut mode = ShadingMode::default();
        for _ in 0..ShadingMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, ShadingMode::default());
    }

    #[test]
    fn parse_mode_names() {
        for mode in ShadingMode::ALL {
            assert_eq!(mode.name().parse::<ShadingMode>().unwrap(), mode);
        }
        assert!("normals".parse::<ShadingMode>().is_err());
    }

    #[test]
    fn misses_show_sky_or_background() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let miss = result(StepOutcome::BudgetExhausted, Vec3::ZERO, 20);
        assert_relative_eq!(
            shade(&miss, &ray, ShadingMode::Position, 63, None),
            Vec3::new(0.5, 0.7, 1.0)
        );
        assert_eq!(
            shade(&miss, &ray, ShadingMode::FaceAxis, 63, Some(Vec3::ZERO)),
            Vec3::ZERO
        );
    }

    #[test]
    fn outcome_mode_separates_misses() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let colors: Vec<Vec3> = [
            StepOutcome::Hit,
            StepOutcome::ChunkExit,
            StepOutcome::BudgetExhausted,
        ]
        .into_iter()
        .map(|outcome| shade(&result(outcome, Vec3::ONE, 5), &ray, ShadingMode::Outcome, 63, None))
        .collect();
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn step_heatmap_ends() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let cheap = result(StepOutcome::Hit, Vec3::ONE, 0);
        let costly = result(StepOutcome::Hit, Vec3::ONE, 63);
        assert_eq!(shade(&cheap, &ray, ShadingMode::TraversalSteps, 63, None), Vec3::Z);
        assert_eq!(shade(&costly, &ray, ShadingMode::TraversalSteps, 63, None), Vec3::X);
    }

    #[test]
    fn position_colors_wrap() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = result(StepOutcome::Hit, Vec3::new(-32.0, 0.5, 96.0), 3);
        let color = shade(&hit, &ray, ShadingMode::Position, 63, None);
        assert_relative_eq!(color, Vec3::new(0.5, 0.5 / 64.0, 0.5));
    }

    #[test]
    fn quantize_colors() {
        assert_eq!(to_rgba8(Vec3::new(0.0, 0.5, 2.0)), [0, 128, 255, 255]);
    }
}
