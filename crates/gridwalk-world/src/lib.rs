//! Procedural voxel worlds for the gridwalk voxel tracer.
//!
//! Voxels are never stored. A world is a [`VoxelOracle`]: a pure predicate
//! answering whether a grid cell at a given scale is occupied.

pub mod oracle;
pub mod scene;
pub mod sdf;
pub mod shapes;

pub use oracle::{from_fn, CountingOracle, FnOracle, VoxelOracle};
pub use scene::{OracleKind, SceneConfig};
pub use sdf::{SdfShell, SdfVolume, SignedDistance, Union};
pub use shapes::{Empty, Floor, Lattice, SineHeightField};
