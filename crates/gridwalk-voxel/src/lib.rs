//! Hierarchical voxel ray traversal.
//!
//! A ray is walked through a uniform grid with a DDA stepper, first at a
//! coarse scale to skip empty space, then again at finer scales inside the
//! coarse cell that was hit. The hierarchy is a plain list of levels; no tree
//! is ever built.
//!
//! ```
//! use glam::Vec3;
//! use gridwalk_core::Ray;
//! use gridwalk_voxel::{traverse, TraversalConfig};
//! use gridwalk_world::Floor;
//!
//! let levels = TraversalConfig::default().build().unwrap();
//! let ray = Ray::new(Vec3::new(0.5, 40.0, 0.5), Vec3::new(0.3, -1.0, 0.2));
//! let result = traverse(&ray, &levels, &Floor::new(0));
//! assert!(result.is_hit());
//! ```

pub mod chunk;
pub mod hierarchy;
pub mod levels;
pub mod stepper;

pub use chunk::Chunk;
pub use hierarchy::{traverse, traverse_flat, TraversalResult};
pub use levels::{parse_levels, LevelConfig, TraversalConfig, TraversalLevels};
pub use stepper::{step, StepOutcome, StepResult};
