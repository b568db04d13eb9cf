//! Math utilities and helpers.

use glam::Vec3;

use crate::constants::DIRECTION_EPSILON;

/// Ray for voxel traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized by `new`, but any length is accepted)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get a point along the ray at distance t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same direction, different origin.
    #[inline]
    #[must_use]
    pub const fn with_origin(&self, origin: Vec3) -> Self {
        Self {
            origin,
            direction: self.direction,
        }
    }

    /// Direction as used by grid stepping.
    ///
    /// The direction is normalized and every zero component is replaced by
    /// [`DIRECTION_EPSILON`] carrying the zero's sign, so `1 / direction` is
    /// finite on all axes. A zero-length direction becomes a positive
    /// epsilon diagonal.
    #[inline]
    pub fn traversal_direction(&self) -> Vec3 {
        let d = self.direction.normalize_or_zero();
        Vec3::new(
            substitute_zero(d.x),
            substitute_zero(d.y),
            substitute_zero(d.z),
        )
    }
}

#[inline]
fn substitute_zero(component: f32) -> f32 {
    if component == 0.0 {
        DIRECTION_EPSILON.copysign(component)
    } else {
        component
    }
}

/// Largest `f32` strictly below `x` (for finite `x`).
#[inline]
pub fn next_below(x: f32) -> f32 {
    if x.is_nan() || x == f32::NEG_INFINITY {
        return x;
    }
    if x == 0.0 {
        return -f32::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    }
}

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at origin with given half-extents
    #[inline]
    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Self {
            min: -half_extents,
            max: half_extents,
        }
    }

    /// Get the center of the AABB
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the AABB
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the half-extents of the AABB
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Check if a point is inside the AABB, boundary included
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Check if a point is inside `[min, max)` on every axis
    #[inline]
    pub fn contains_point_half_open(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmplt(self.max).all()
    }

    /// Clamp a point into `[min, max)` on every axis.
    #[inline]
    pub fn clamp_half_open(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, next_below(self.max.x)),
            point.y.clamp(self.min.y, next_below(self.max.y)),
            point.z.clamp(self.min.z, next_below(self.max.z)),
        )
    }
}
