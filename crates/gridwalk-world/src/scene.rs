//! Scene configuration: which oracle strategy to trace, and where to look.

use std::str::FromStr;

use glam::Vec3;
use gridwalk_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::oracle::VoxelOracle;
use crate::sdf::{SdfShell, SdfVolume};
use crate::shapes::{Empty, Floor, Lattice, SineHeightField};

/// Oracle strategy selected by configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleKind {
    Empty,
    Floor(Floor),
    Shell(SdfShell),
    SineField(SineHeightField),
    Lattice(Lattice),
}

impl OracleKind {
    /// Short name used on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Floor(_) => "floor",
            Self::Shell(_) => "shell",
            Self::SineField(_) => "sine",
            Self::Lattice(_) => "lattice",
        }
    }

    /// Check parameters for values the strategy cannot answer sensibly.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Empty | Self::Floor(_) => Ok(()),
            Self::Shell(shell) => {
                let finite = shell.center.is_finite()
                    && shell.half_extent.is_finite()
                    && shell.outer_radius.is_finite()
                    && shell.inner_radius.is_finite();
                if !finite || shell.half_extent <= 0.0 || shell.outer_radius <= 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "shell extents must be positive and finite: {shell:?}"
                    )));
                }
                if shell.inner_radius < 0.0 || shell.inner_radius >= shell.outer_radius {
                    return Err(Error::InvalidConfig(format!(
                        "shell inner radius {} must lie in [0, {})",
                        shell.inner_radius, shell.outer_radius
                    )));
                }
                Ok(())
            }
            Self::SineField(field) => {
                let finite =
                    field.amplitude.is_finite() && field.period.is_finite() && field.base.is_finite();
                if !finite || field.period == 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "sine field needs finite values and a non-zero period: {field:?}"
                    )));
                }
                Ok(())
            }
            Self::Lattice(lattice) => {
                if lattice.period == 0 {
                    return Err(Error::InvalidConfig(
                        "lattice period must be at least 1".to_string(),
                    ));
                }
                if lattice.size == 0 || lattice.size > lattice.period {
                    return Err(Error::InvalidConfig(format!(
                        "lattice block size {} must lie in [1, {}]",
                        lattice.size, lattice.period
                    )));
                }
                Ok(())
            }
        }
    }

    /// Validate and instantiate the strategy.
    pub fn build(&self) -> Result<Box<dyn VoxelOracle>> {
        self.validate()?;
        let oracle: Box<dyn VoxelOracle> = match *self {
            Self::Empty => Box::new(Empty),
            Self::Floor(floor) => Box::new(floor),
            Self::Shell(shell) => Box::new(SdfVolume(shell)),
            Self::SineField(field) => Box::new(field),
            Self::Lattice(lattice) => Box::new(lattice),
        };
        info!("Built {} oracle", self.name());
        Ok(oracle)
    }
}

/// A traceable scene: an oracle plus a suggested camera orbit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Occupancy strategy.
    pub oracle: OracleKind,
    /// Point the camera orbits around and looks at.
    pub focus: Vec3,
    /// Horizontal orbit distance from the focus.
    pub orbit_radius: f32,
    /// Camera height above the focus.
    pub eye_height: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::shell()
    }
}

impl SceneConfig {
    /// Names accepted by [`SceneConfig::preset`].
    pub const PRESETS: [&'static str; 5] = ["empty", "floor", "shell", "sine", "lattice"];

    /// Flat floor at `y = 0`.
    pub fn floor() -> Self {
        Self {
            oracle: OracleKind::Floor(Floor::new(0)),
            focus: Vec3::ZERO,
            orbit_radius: 40.0,
            eye_height: 20.0,
        }
    }

    /// Hollow rounded cube inside the 64-unit cell at the origin.
    pub fn shell() -> Self {
        let shell = SdfShell::default();
        Self {
            oracle: OracleKind::Shell(shell),
            focus: shell.center,
            orbit_radius: 90.0,
            eye_height: 45.0,
        }
    }

    /// Rolling periodic terrain seen from high above.
    ///
    /// The surface stays in the top quarter of the 64-unit layer it lives in,
    /// so rays entering that layer from above reach it within a few cells.
    pub fn sine() -> Self {
        let field = SineHeightField::new(8.0, 24.0).with_base(56.0);
        Self {
            oracle: OracleKind::SineField(field),
            focus: Vec3::new(0.0, field.base, 0.0),
            orbit_radius: 40.0,
            eye_height: 80.0,
        }
    }

    /// Solid blocks, one in the corner of every eighth 64-unit cell.
    pub fn lattice() -> Self {
        Self {
            oracle: OracleKind::Lattice(Lattice::new(128, 56)),
            focus: Vec3::splat(28.0),
            orbit_radius: 120.0,
            eye_height: 90.0,
        }
    }

    /// Nothing to hit; every ray exhausts its budget.
    pub fn empty() -> Self {
        Self {
            oracle: OracleKind::Empty,
            focus: Vec3::ZERO,
            orbit_radius: 32.0,
            eye_height: 16.0,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "empty" => Ok(Self::empty()),
            "floor" => Ok(Self::floor()),
            "shell" => Ok(Self::shell()),
            "sine" => Ok(Self::sine()),
            "lattice" => Ok(Self::lattice()),
            other => Err(Error::InvalidData(format!(
                "unknown scene '{other}', expected one of {:?}",
                Self::PRESETS
            ))),
        }
    }

    /// Set the orbit radius.
    #[must_use]
    pub fn with_orbit_radius(mut self, radius: f32) -> Self {
        self.orbit_radius = radius;
        self
    }

    /// Camera position at `angle` radians around the orbit.
    pub fn orbit_position(&self, angle: f32) -> Vec3 {
        self.focus
            + Vec3::new(
                angle.cos() * self.orbit_radius,
                self.eye_height,
                angle.sin() * self.orbit_radius,
            )
    }
}

impl FromStr for SceneConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::preset(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwalk_core::GridCoord;

    #[test]
    fn all_presets_build() {
        for name in SceneConfig::PRESETS {
            let scene: SceneConfig = name.parse().unwrap();
            assert_eq!(scene.oracle.name(), name);
            assert!(scene.oracle.build().is_ok());
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            SceneConfig::preset("castle"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let inverted = OracleKind::Shell(SdfShell {
            inner_radius: 40.0,
            ..SdfShell::default()
        });
        assert!(matches!(inverted.build(), Err(Error::InvalidConfig(_))));

        let flat = OracleKind::SineField(SineHeightField::new(1.0, 0.0));
        assert!(flat.validate().is_err());

        let lattice = OracleKind::Lattice(Lattice::points(0));
        assert!(lattice.validate().is_err());

        let oversized = OracleKind::Lattice(Lattice::new(4, 5));
        assert!(oversized.validate().is_err());

        let sunk = OracleKind::SineField(SineHeightField::new(1.0, 4.0).with_base(f32::NAN));
        assert!(sunk.validate().is_err());
    }

    #[test]
    fn built_floor_answers_like_strategy() {
        let oracle = SceneConfig::floor().oracle.build().unwrap();
        assert!(oracle.occupied(GridCoord::new(0, -1, 0), 1));
        assert!(!oracle.occupied(GridCoord::new(0, 0, 0), 1));
    }

    #[test]
    fn orbit_cameras_start_in_empty_coarse_cells() {
        for name in SceneConfig::PRESETS {
            let scene = SceneConfig::preset(name).unwrap();
            let oracle = scene.oracle.build().unwrap();
            for step in 0..8 {
                let eye = scene.orbit_position(step as f32 * 0.8);
                assert!(
                    !oracle.occupied(GridCoord::containing(eye, 64), 64),
                    "{name} camera starts inside claimed content at {eye:?}"
                );
            }
        }
    }

    #[test]
    fn orbit_position_keeps_radius() {
        let scene = SceneConfig::floor().with_orbit_radius(10.0);
        let eye = scene.orbit_position(1.234);
        let horizontal = (eye - scene.focus) * Vec3::new(1.0, 0.0, 1.0);
        approx::assert_relative_eq!(horizontal.length(), 10.0, epsilon = 1e-4);
        assert_eq!(eye.y, scene.eye_height);
    }
}
