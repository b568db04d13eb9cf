//! The voxel oracle contract and generic adapters.

use std::sync::Arc;

use gridwalk_core::GridCoord;
use hashbrown::HashMap;
use parking_lot::Mutex;

/// Occupancy predicate over an implicit voxel lattice.
///
/// Implementations must be pure and total: for any cell and scale they
/// return promptly, never panic, and never depend on what was queried
/// before. For `scale > 1` an answer of `false` must guarantee that no
/// scale-1 voxel inside the cell is occupied; `true` may be conservative.
pub trait VoxelOracle: Send + Sync {
    /// Whether `cell` (in a grid of `scale` world units per cell) is occupied.
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool;
}

impl<T: VoxelOracle + ?Sized> VoxelOracle for &T {
    #[inline]
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        (**self).occupied(cell, scale)
    }
}

impl<T: VoxelOracle + ?Sized> VoxelOracle for Box<T> {
    #[inline]
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        (**self).occupied(cell, scale)
    }
}

impl<T: VoxelOracle + ?Sized> VoxelOracle for Arc<T> {
    #[inline]
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        (**self).occupied(cell, scale)
    }
}

/// Oracle backed by a closure.
#[derive(Clone, Copy)]
pub struct FnOracle<F>(F);

impl<F> VoxelOracle for FnOracle<F>
where
    F: Fn(GridCoord, u32) -> bool + Send + Sync,
{
    #[inline]
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        (self.0)(cell, scale)
    }
}

/// Wrap a closure as an oracle.
pub const fn from_fn<F>(f: F) -> FnOracle<F>
where
    F: Fn(GridCoord, u32) -> bool + Send + Sync,
{
    FnOracle(f)
}

/// Oracle wrapper that counts queries per scale.
///
/// Used for diagnostics and to check which hierarchy levels a traversal
/// actually visited. Counting takes a lock per query, so keep it out of
/// production frame rendering.
pub struct CountingOracle<O> {
    inner: O,
    queries: Mutex<HashMap<u32, u64>>,
}

impl<O: VoxelOracle> CountingOracle<O> {
    /// Wrap an oracle with zeroed counters.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            queries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of queries made at `scale` since creation or the last reset.
    pub fn queries_at(&self, scale: u32) -> u64 {
        self.queries.lock().get(&scale).copied().unwrap_or(0)
    }

    /// Number of queries made at any scale.
    pub fn total_queries(&self) -> u64 {
        self.queries.lock().values().sum()
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.queries.lock().clear();
    }

    /// Get the wrapped oracle.
    pub const fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O: VoxelOracle> VoxelOracle for CountingOracle<O> {
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        *self.queries.lock().entry(scale).or_insert(0) += 1;
        self.inner.occupied(cell, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_oracle() {
        let oracle = from_fn(|cell: GridCoord, _scale| cell.y < 0);
        assert!(oracle.occupied(GridCoord::new(0, -1, 0), 1));
        assert!(!oracle.occupied(GridCoord::new(0, 0, 0), 1));
    }

    #[test]
    fn boxed_and_borrowed_oracles_delegate() {
        let boxed: Box<dyn VoxelOracle> = Box::new(from_fn(|_, scale| scale == 8));
        assert!(boxed.occupied(GridCoord::default(), 8));
        let borrowed = &boxed;
        assert!(!borrowed.occupied(GridCoord::default(), 1));
    }

    #[test]
    fn counting_oracle_tracks_scales() {
        let oracle = CountingOracle::new(from_fn(|_, _| false));
        for _ in 0..3 {
            oracle.occupied(GridCoord::default(), 8);
        }
        oracle.occupied(GridCoord::default(), 1);

        assert_eq!(oracle.queries_at(8), 3);
        assert_eq!(oracle.queries_at(1), 1);
        assert_eq!(oracle.queries_at(64), 0);
        assert_eq!(oracle.total_queries(), 4);

        oracle.reset();
        assert_eq!(oracle.total_queries(), 0);
    }
}
