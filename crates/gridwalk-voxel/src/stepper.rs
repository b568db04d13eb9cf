//! Single-scale grid DDA stepping, optionally confined to a chunk.
//!
//! The stepper walks cell by cell (Amanatides–Woo): at each iteration it
//! checks the chunk bound, asks the oracle about the current cell, then
//! crosses the nearest cell boundary. All positions inside the loop are kept
//! in cell units of the level's scale.

use glam::{IVec3, Vec3};
use gridwalk_core::{Axis, GridCoord, Ray};
use gridwalk_world::VoxelOracle;

use crate::chunk::Chunk;
use crate::levels::LevelConfig;

/// Why a stepping run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The oracle reported the current cell occupied.
    Hit,
    /// The ray left the chunk it was confined to.
    ChunkExit,
    /// The iteration budget ran out.
    BudgetExhausted,
}

/// Result of one stepping run at a single scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    /// Why stepping stopped.
    pub outcome: StepOutcome,
    /// Cell the ray was in when stepping stopped.
    pub cell: GridCoord,
    /// Scale `cell` refers to.
    pub scale: u32,
    /// World-space position of the ray when stepping stopped.
    ///
    /// For hits this lies inside `cell`:
    /// `cell * scale <= position < (cell + 1) * scale` on every axis.
    pub position: Vec3,
    /// Axis of the most recent step, `None` if the ray never stepped.
    pub face_axis: Option<Axis>,
    /// Outward normal of the face the ray entered `cell` through.
    pub face_normal: IVec3,
    /// Iterations performed, at most the level's budget.
    pub steps: u32,
}

impl StepResult {
    /// Returns true if an occupied cell was found
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.outcome == StepOutcome::Hit
    }
}

/// Mutable DDA state, scoped to a single [`step`] call.
#[derive(Clone, Copy, Debug)]
struct StepState {
    cell: GridCoord,
    /// Offset inside `cell`, in cell units.
    within: Vec3,
    direction: Vec3,
    ray_sign: IVec3,
    ray_inverse: Vec3,
    /// Boundary `within` is heading for: 1 on positive axes, 0 on negative.
    step_target: Vec3,
    face_axis: Option<Axis>,
}

impl StepState {
    fn new(ray: &Ray, scale: u32) -> Self {
        let direction = ray.traversal_direction();
        let ray_sign = IVec3::new(
            sign_of(direction.x),
            sign_of(direction.y),
            sign_of(direction.z),
        );
        let origin = ray.origin / scale as f32;
        let floor = origin.floor();
        Self {
            cell: GridCoord::containing(ray.origin, scale),
            within: origin - floor,
            direction,
            ray_sign,
            ray_inverse: direction.recip(),
            step_target: Vec3::select(direction.cmpgt(Vec3::ZERO), Vec3::ONE, Vec3::ZERO),
            face_axis: None,
        }
    }

    /// Pull the starting cell into `chunk` when float division put an origin
    /// lying inside the chunk one cell past its edge.
    fn confine_start(&mut self, chunk: &Chunk, origin: Vec3, scale: u32) {
        if !chunk.bounds(scale).contains_point_half_open(origin) {
            return;
        }
        for axis in Axis::ALL {
            let i = axis.index();
            let low = chunk.entry.get(axis);
            let high = low.saturating_add(chunk.extent - 1);
            let current = self.cell.get(axis);
            if current < low {
                self.cell = self.cell.offset(axis, low.saturating_sub(current));
                self.within[i] = 0.0;
            } else if current > high {
                self.cell = self.cell.offset(axis, high.saturating_sub(current));
                self.within[i] = 1.0;
            }
        }
    }

    /// Axis whose cell boundary the ray reaches first, with its distance.
    ///
    /// Ties resolve x, then y, then z.
    #[inline]
    fn next_crossing(&self) -> (Axis, f32) {
        let t = (self.step_target - self.within) * self.ray_inverse;
        if t.x <= t.y && t.x <= t.z {
            (Axis::X, t.x)
        } else if t.y <= t.z {
            (Axis::Y, t.y)
        } else {
            (Axis::Z, t.z)
        }
    }

    /// Cross into the neighbouring cell along the nearest boundary.
    #[inline]
    fn advance(&mut self) {
        let (axis, t) = self.next_crossing();
        let i = axis.index();
        let sign = self.ray_sign[i];

        self.cell = self.cell.offset(axis, sign);
        self.within += self.direction * t;
        // Land exactly on the shared face to stop drift accumulating
        self.within[i] = if sign > 0 { 0.0 } else { 1.0 };
        self.face_axis = Some(axis);
    }

    #[inline]
    fn position(&self, scale: u32) -> Vec3 {
        (self.cell.to_vec3() + self.within) * scale as f32
    }

    fn face_normal(&self) -> IVec3 {
        self.face_axis.map_or(IVec3::ZERO, |axis| {
            -axis.unit() * self.ray_sign[axis.index()]
        })
    }

    fn finish(&self, outcome: StepOutcome, scale: u32, steps: u32) -> StepResult {
        let position = match outcome {
            StepOutcome::Hit => self
                .cell
                .bounds(scale)
                .clamp_half_open(self.position(scale)),
            StepOutcome::ChunkExit | StepOutcome::BudgetExhausted => self.position(scale),
        };
        StepResult {
            outcome,
            cell: self.cell,
            scale,
            position,
            face_axis: self.face_axis,
            face_normal: self.face_normal(),
            steps,
        }
    }
}

#[inline]
fn sign_of(component: f32) -> i32 {
    if component.is_sign_negative() {
        -1
    } else {
        1
    }
}

/// Walk `ray` through the grid of `level.scale` until the oracle reports an
/// occupied cell, the ray leaves `bound`, or `level.max_steps` iterations
/// have run.
///
/// Each iteration checks the bound first, then queries the oracle, then steps.
/// With no bound this is the plain single-scale stepper. Never panics and
/// never exceeds the budget, including for axis-aligned rays.
pub fn step<O: VoxelOracle + ?Sized>(
    ray: &Ray,
    level: LevelConfig,
    bound: Option<&Chunk>,
    oracle: &O,
) -> StepResult {
    let scale = level.scale.max(1);
    let mut state = StepState::new(ray, scale);
    if let Some(chunk) = bound {
        state.confine_start(chunk, ray.origin, scale);
    }

    for iteration in 1..=level.max_steps {
        if let Some(chunk) = bound {
            if !chunk.contains(state.cell) {
                return state.finish(StepOutcome::ChunkExit, scale, iteration);
            }
        }
        if oracle.occupied(state.cell, scale) {
            return state.finish(StepOutcome::Hit, scale, iteration);
        }
        state.advance();
    }

    state.finish(StepOutcome::BudgetExhausted, scale, level.max_steps)
}
