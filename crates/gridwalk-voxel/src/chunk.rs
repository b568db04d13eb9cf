//! Bounds that confine a finer traversal to one coarse cell.

use gridwalk_core::{Aabb, Axis, GridCoord};
use serde::{Deserialize, Serialize};

/// Cube of cells in some grid, given by its minimum cell and edge length.
///
/// When derived from a coarse hit, `entry` is the coarse cell's origin in
/// child cells and `extent` is the coarse cell size in child cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// Minimum cell of the chunk.
    pub entry: GridCoord,
    /// Edge length in cells.
    pub extent: i32,
}

impl Chunk {
    /// Create a new chunk
    #[inline]
    pub const fn new(entry: GridCoord, extent: i32) -> Self {
        Self { entry, extent }
    }

    /// Chunk in the child grid covered by one parent cell.
    ///
    /// `parent_scale` must be a multiple of `child_scale`.
    #[inline]
    pub const fn from_parent_cell(parent: GridCoord, parent_scale: u32, child_scale: u32) -> Self {
        Self {
            entry: parent.to_finer(parent_scale, child_scale),
            extent: (parent_scale / child_scale) as i32,
        }
    }

    /// Whether `cell` lies inside the chunk on every axis.
    #[inline]
    pub fn contains(&self, cell: GridCoord) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let offset = i64::from(cell.get(axis)) - i64::from(self.entry.get(axis));
            (0..i64::from(self.extent)).contains(&offset)
        })
    }

    /// World-space bounds of the chunk for cells of `scale`.
    #[inline]
    pub fn bounds(&self, scale: u32) -> Aabb {
        let min = self.entry.min_corner(scale);
        Aabb::new(min, min + self.extent as f32 * scale as f32)
    }
}
