//! Signed distance primitives and the SDF-backed oracle.
//!
//! Distances are negative inside a shape. All primitives and combinators here
//! are 1-Lipschitz, so any field can bound a box from one sample at its
//! center. Shapes with a closed-form box test override that bound with a
//! tighter one.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use gridwalk_core::{Aabb, GridCoord};

use crate::oracle::VoxelOracle;

/// Absorbs f32 rounding so box tests never reject a solid point.
const DISTANCE_SLACK: f32 = 1e-3;

/// Signed distance to a sphere centered at the origin.
#[inline]
pub fn sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Signed distance to an axis-aligned box centered at the origin.
#[inline]
pub fn cuboid(p: Vec3, half_extents: Vec3) -> f32 {
    let q = p.abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Union of two shapes.
#[inline]
pub fn union(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// Intersection of two shapes.
#[inline]
pub fn intersection(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Shape `a` with shape `b` carved out.
#[inline]
pub fn subtraction(a: f32, b: f32) -> f32 {
    a.max(-b)
}

/// A signed distance field over world space.
pub trait SignedDistance: Send + Sync {
    /// Signed distance from `p` to the surface (negative inside).
    fn distance(&self, p: Vec3) -> f32;

    /// Whether some point of `bounds` may have a non-positive distance.
    ///
    /// Must never return false when such a point exists. The default samples
    /// the center and widens by the half diagonal.
    fn may_be_inside(&self, bounds: &Aabb) -> bool {
        let reach = bounds.half_extents().length() + DISTANCE_SLACK;
        self.distance(bounds.center()) <= reach
    }
}

/// Hollow shell: a cube intersected with a sphere, minus a smaller sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SdfShell {
    pub center: Vec3,
    pub half_extent: f32,
    pub outer_radius: f32,
    pub inner_radius: f32,
}

impl Default for SdfShell {
    fn default() -> Self {
        Self {
            center: Vec3::splat(32.0),
            half_extent: 24.0,
            outer_radius: 30.0,
            inner_radius: 20.0,
        }
    }
}

impl SignedDistance for SdfShell {
    fn distance(&self, p: Vec3) -> f32 {
        let p = p - self.center;
        let rounded_cube = intersection(
            cuboid(p, Vec3::splat(self.half_extent)),
            sphere(p, self.outer_radius),
        );
        subtraction(rounded_cube, sphere(p, self.inner_radius))
    }

    fn may_be_inside(&self, bounds: &Aabb) -> bool {
        let lo = bounds.min - self.center;
        let hi = bounds.max - self.center;

        // Overlaps the cube
        let half = Vec3::splat(self.half_extent + DISTANCE_SLACK);
        if lo.cmpgt(half).any() || hi.cmplt(-half).any() {
            return false;
        }
        // Reaches into the outer sphere
        let nearest = Vec3::ZERO.clamp(lo, hi);
        if nearest.length() > self.outer_radius + DISTANCE_SLACK {
            return false;
        }
        // Pokes out of the cavity
        let farthest = lo.abs().max(hi.abs());
        farthest.length() >= self.inner_radius - DISTANCE_SLACK
    }
}

/// Union of two signed distance fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Union<A, B>(pub A, pub B);

impl<A: SignedDistance, B: SignedDistance> SignedDistance for Union<A, B> {
    fn distance(&self, p: Vec3) -> f32 {
        union(self.0.distance(p), self.1.distance(p))
    }

    fn may_be_inside(&self, bounds: &Aabb) -> bool {
        self.0.may_be_inside(bounds) || self.1.may_be_inside(bounds)
    }
}

/// Oracle over a signed distance field.
///
/// A scale-1 voxel is occupied when the field is non-positive at its
/// center. A coarser cell is occupied when the box spanning the centers of
/// the voxels it covers may reach inside the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SdfVolume<S>(pub S);

impl<S: SignedDistance> VoxelOracle for SdfVolume<S> {
    fn occupied(&self, cell: GridCoord, scale: u32) -> bool {
        if scale <= 1 {
            return self.0.distance(cell.center(1)) <= 0.0;
        }
        let first = cell.min_corner(scale) + 0.5;
        let centers = Aabb::new(first, first + (scale - 1) as f32);
        self.0.may_be_inside(&centers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn primitive_distances() {
        assert_relative_eq!(sphere(Vec3::new(3.0, 0.0, 0.0), 1.0), 2.0);
        assert_relative_eq!(sphere(Vec3::ZERO, 1.0), -1.0);
        assert_relative_eq!(cuboid(Vec3::new(3.0, 0.0, 0.0), Vec3::ONE), 2.0);
        assert_relative_eq!(cuboid(Vec3::ZERO, Vec3::ONE), -1.0);
        assert_relative_eq!(
            cuboid(Vec3::new(2.0, 2.0, 1.0), Vec3::ONE),
            2.0_f32.sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn combinators() {
        assert_eq!(union(-1.0, 2.0), -1.0);
        assert_eq!(intersection(-1.0, 2.0), 2.0);
        assert_eq!(subtraction(-1.0, -0.5), 0.5);
    }

    #[test]
    fn shell_is_hollow() {
        let shell = SdfShell {
            center: Vec3::ZERO,
            half_extent: 10.0,
            outer_radius: 12.0,
            inner_radius: 6.0,
        };
        assert!(shell.distance(Vec3::ZERO) > 0.0, "cavity is empty");
        assert!(shell.distance(Vec3::new(8.0, 0.0, 0.0)) < 0.0, "wall is solid");
        assert!(shell.distance(Vec3::new(11.0, 0.0, 0.0)) > 0.0, "outside box");
        // Cube corner is cut away by the outer sphere
        assert!(shell.distance(Vec3::splat(9.5)) > 0.0);
    }

    #[test]
    fn union_of_fields() {
        let a = SdfShell {
            center: Vec3::new(-20.0, 0.0, 0.0),
            ..SdfShell::default()
        };
        let b = SdfShell {
            center: Vec3::new(20.0, 0.0, 0.0),
            ..SdfShell::default()
        };
        let both = Union(a, b);
        let p = Vec3::new(-20.0 + 22.0, 0.0, 0.0);
        assert_eq!(both.distance(p), a.distance(p).min(b.distance(p)));
    }

    /// Sphere relying on the default box bound.
    struct Ball(f32);

    impl SignedDistance for Ball {
        fn distance(&self, p: Vec3) -> f32 {
            sphere(p, self.0)
        }
    }

    /// Hides a shape's own box test behind the default one.
    struct DistanceOnly<S>(S);

    impl<S: SignedDistance> SignedDistance for DistanceOnly<S> {
        fn distance(&self, p: Vec3) -> f32 {
            self.0.distance(p)
        }
    }

    fn any_voxel_occupied(volume: &impl VoxelOracle, coarse: GridCoord, scale: u32) -> bool {
        let base = coarse.to_finer(scale, 1);
        let n = scale as i32;
        (0..n).any(|dz| {
            (0..n).any(|dy| {
                (0..n).any(|dx| {
                    volume.occupied(GridCoord::new(base.x + dx, base.y + dy, base.z + dz), 1)
                })
            })
        })
    }

    #[test]
    fn unit_voxels_follow_distance_sign() {
        let shell = SdfShell::default();
        let volume = SdfVolume(shell);
        for x in 0..64 {
            let cell = GridCoord::new(x, 32, 32);
            assert_eq!(volume.occupied(cell, 1), shell.distance(cell.center(1)) <= 0.0);
        }
    }

    #[test]
    fn shell_box_bound_is_tight_above_and_inside() {
        let volume = SdfVolume(SdfShell::default());
        // The shell spans y in [8, 56], so the 64-cell layer above is empty
        assert!(!volume.occupied(GridCoord::new(0, 1, 0), 64));
        assert!(volume.occupied(GridCoord::new(0, 0, 0), 64));
        // A scale-8 cell inside the cavity
        assert!(!volume.occupied(GridCoord::new(3, 3, 3), 8));
        // Center sampling alone cannot rule out the layer above
        let sampled = SdfVolume(DistanceOnly(SdfShell::default()));
        assert!(sampled.occupied(GridCoord::new(0, 1, 0), 64));
    }

    #[test]
    fn shell_box_bound_is_conservative() {
        let volume = SdfVolume(SdfShell::default());
        for z in 0..8 {
            for y in 0..8 {
                for x in 0..8 {
                    let coarse = GridCoord::new(x, y, z);
                    if any_voxel_occupied(&volume, coarse, 8) {
                        assert!(volume.occupied(coarse, 8), "{coarse:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn default_bound_is_conservative() {
        let volume = SdfVolume(Ball(9.5));
        for z in -3..3 {
            for y in -3..3 {
                for x in -3..3 {
                    let coarse = GridCoord::new(x, y, z);
                    if any_voxel_occupied(&volume, coarse, 4) {
                        assert!(volume.occupied(coarse, 4), "{coarse:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn volume_is_conservative() {
        let volume = SdfVolume(SdfShell {
            center: Vec3::new(3.0, 1.0, -2.0),
            half_extent: 9.0,
            outer_radius: 11.0,
            inner_radius: 6.0,
        });
        for z in -3..3 {
            for y in -3..3 {
                for x in -3..3 {
                    let coarse = GridCoord::new(x, y, z);
                    if any_voxel_occupied(&volume, coarse, 4) {
                        assert!(volume.occupied(coarse, 4), "{coarse:?}");
                    }
                }
            }
        }
    }
}
