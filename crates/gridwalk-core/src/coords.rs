//! Grid coordinate systems for the scaled voxel lattice.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::Aabb;

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in tie-break priority order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis in a vector.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit integer vector along this axis.
    #[inline]
    pub const fn unit(self) -> IVec3 {
        match self {
            Self::X => IVec3::X,
            Self::Y => IVec3::Y,
            Self::Z => IVec3::Z,
        }
    }
}

/// Integer cell index in a grid whose cells are `scale` world units wide.
///
/// A `GridCoord` only has meaning together with the scale it was computed
/// for; the scale is passed alongside rather than stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing a world-space point at the given scale.
    #[inline]
    pub fn containing(point: Vec3, scale: u32) -> Self {
        let cell = (point / scale as f32).floor();
        Self::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// Component along an axis.
    #[inline]
    pub const fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Move `delta` cells along an axis, saturating at the grid's edge.
    #[inline]
    #[must_use]
    pub const fn offset(self, axis: Axis, delta: i32) -> Self {
        match axis {
            Axis::X => Self::new(self.x.saturating_add(delta), self.y, self.z),
            Axis::Y => Self::new(self.x, self.y.saturating_add(delta), self.z),
            Axis::Z => Self::new(self.x, self.y, self.z.saturating_add(delta)),
        }
    }

    /// Coordinate of this cell's minimum corner in a finer grid.
    ///
    /// `parent_scale` must be a multiple of `child_scale`.
    #[inline]
    #[must_use]
    pub const fn to_finer(self, parent_scale: u32, child_scale: u32) -> Self {
        let ratio = (parent_scale / child_scale) as i32;
        Self::new(
            self.x.saturating_mul(ratio),
            self.y.saturating_mul(ratio),
            self.z.saturating_mul(ratio),
        )
    }

    /// World-space minimum corner of the cell.
    #[inline]
    pub fn min_corner(self, scale: u32) -> Vec3 {
        self.to_vec3() * scale as f32
    }

    /// World-space center of the cell.
    #[inline]
    pub fn center(self, scale: u32) -> Vec3 {
        (self.to_vec3() + Vec3::splat(0.5)) * scale as f32
    }

    /// World-space bounds of the cell.
    #[inline]
    pub fn bounds(self, scale: u32) -> Aabb {
        let min = self.min_corner(scale);
        Aabb::new(min, min + Vec3::splat(scale as f32))
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Convert to floating point Vec3
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl From<IVec3> for GridCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
