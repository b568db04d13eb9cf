//! Coarse-to-fine traversal over a list of scale levels.

use glam::{IVec3, Vec3};
use gridwalk_core::{Axis, GridCoord, Ray};
use gridwalk_world::VoxelOracle;

use crate::chunk::Chunk;
use crate::levels::{LevelConfig, TraversalLevels};
use crate::stepper::{step, StepOutcome, StepResult};

/// Final result of a traversal across all levels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraversalResult {
    /// Outcome of the level traversal stopped at.
    pub outcome: StepOutcome,
    /// Hit position, or where the ray was when it gave up.
    pub position: Vec3,
    /// Cell `position` refers to.
    pub cell: GridCoord,
    /// Scale of `cell`.
    pub scale: u32,
    /// Index of the level traversal stopped at, 0 being the coarsest.
    pub level: usize,
    /// Axis of the last grid step taken at any level.
    pub face_axis: Option<Axis>,
    /// Outward normal of the face the ray entered `cell` through.
    pub face_normal: IVec3,
    /// Iterations summed over every level visited.
    pub steps: u32,
}

impl TraversalResult {
    fn from_step(result: &StepResult, level: usize, steps: u32) -> Self {
        Self {
            outcome: result.outcome,
            position: result.position,
            cell: result.cell,
            scale: result.scale,
            level,
            face_axis: result.face_axis,
            face_normal: result.face_normal,
            steps,
        }
    }

    /// Budget-exhausted result at the ray origin, before any stepping.
    fn unstarted(ray: &Ray) -> Self {
        Self {
            outcome: StepOutcome::BudgetExhausted,
            position: ray.origin,
            cell: GridCoord::containing(ray.origin, 1),
            scale: 1,
            level: 0,
            face_axis: None,
            face_normal: IVec3::ZERO,
            steps: 0,
        }
    }

    /// Returns true if the finest level found an occupied voxel
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.outcome == StepOutcome::Hit
    }
}

/// Trace `ray` through `levels`, coarsest first.
///
/// Each level steps inside the chunk covered by the cell the previous level
/// hit, starting from the previous hit position. A miss at any level ends
/// the traversal there; finer levels are not visited.
pub fn traverse<O: VoxelOracle + ?Sized>(
    ray: &Ray,
    levels: &TraversalLevels,
    oracle: &O,
) -> TraversalResult {
    let configs = levels.levels();
    let mut descent = Descent {
        origin: ray.origin,
        bound: levels.root_bounds(),
        steps: 0,
        entry_face: None,
    };

    for (index, pair) in configs.windows(2).enumerate() {
        let (level, child) = (pair[0], pair[1]);
        let result = descent.step(ray, level, oracle);
        if !result.is_hit() {
            return TraversalResult::from_step(&result, index, descent.steps);
        }
        descent.narrow(&result, level, child);
    }

    match configs.last() {
        Some(&finest) => {
            let result = descent.step(ray, finest, oracle);
            TraversalResult::from_step(&result, configs.len() - 1, descent.steps)
        }
        // Validated level lists are never empty
        None => TraversalResult::unstarted(ray),
    }
}

/// Where the next level starts and what it inherits from the coarser ones.
struct Descent {
    origin: Vec3,
    bound: Option<Chunk>,
    steps: u32,
    entry_face: Option<(Axis, IVec3)>,
}

impl Descent {
    fn step<O: VoxelOracle + ?Sized>(
        &mut self,
        ray: &Ray,
        level: LevelConfig,
        oracle: &O,
    ) -> StepResult {
        let mut result = step(&ray.with_origin(self.origin), level, self.bound.as_ref(), oracle);
        self.steps += result.steps;

        // A hit in the first cell of a chunk was entered through the
        // parent cell's face
        if result.face_axis.is_none() {
            if let Some((axis, normal)) = self.entry_face {
                result.face_axis = Some(axis);
                result.face_normal = normal;
            }
        }
        result
    }

    /// Confine the next level to the cell `hit` found at `level`.
    fn narrow(&mut self, hit: &StepResult, level: LevelConfig, child: LevelConfig) {
        self.origin = hit.position;
        self.bound = Some(Chunk::from_parent_cell(hit.cell, level.scale, child.scale));
        self.entry_face = hit.face_axis.map(|axis| (axis, hit.face_normal));
    }
}

/// Trace `ray` through a single unbounded level.
pub fn traverse_flat<O: VoxelOracle + ?Sized>(
    ray: &Ray,
    level: LevelConfig,
    oracle: &O,
) -> TraversalResult {
    let result = step(ray, level, None, oracle);
    TraversalResult::from_step(&result, 0, result.steps)
}
