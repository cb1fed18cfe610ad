//! Ground and wall proximity sensing.
//!
//! The probe runs once per substep, before the state machine. Misses are
//! reported through sentinel values, never errors; an invalid body handle
//! yields `None` and the caller skips geometry-dependent logic for that
//! substep.

use nalgebra::Vector3;
use rapier3d::prelude::RigidBodyHandle;

use super::constants::{physics, probe as consts};
use super::physics::PhysicsWorld;

/// Surfaces sensed around the character this substep. Recomputed from
/// scratch every probe; no history is kept here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedSurfaces {
    /// Gap between the capsule bottom and the ground below, sentinel on miss
    pub ground_distance: f32,
    /// Surface normal under the character, up-vector on miss
    pub ground_normal: Vector3<f32>,
    /// Horizontal gap between the capsule surface and the nearest wall
    pub wall_distance: f32,
    /// Horizontal wall normal, zero on miss
    pub wall_normal: Vector3<f32>,
    /// Precise impact point on the wall, zero on miss
    pub wall_point: Vector3<f32>,
}

impl Default for SensedSurfaces {
    fn default() -> Self {
        Self {
            ground_distance: physics::NO_HIT_DISTANCE,
            ground_normal: Vector3::y(),
            wall_distance: physics::NO_HIT_DISTANCE,
            wall_normal: Vector3::zeros(),
            wall_point: Vector3::zeros(),
        }
    }
}

impl SensedSurfaces {
    /// Angle between the ground surface and the horizontal plane, degrees
    pub fn slope_angle(&self) -> f32 {
        self.ground_normal
            .dot(&Vector3::y())
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }

    pub fn has_wall(&self) -> bool {
        self.wall_normal.norm_squared() > physics::NORMALIZE_EPSILON
    }
}

/// Issues read-only proximity queries against the physics world.
pub struct GeometryProbe {
    /// How far beyond the capsule surface the wall probe reaches
    pub wall_near_distance: f32,
}

impl GeometryProbe {
    pub fn new(wall_near_distance: f32) -> Self {
        Self { wall_near_distance }
    }

    /// Senses the ground below and the nearest wall around the body.
    /// Returns `None` when the body handle is stale.
    pub fn probe(
        &self,
        world: &PhysicsWorld,
        body: RigidBodyHandle,
        capsule_radius: f32,
        capsule_half_height: f32,
    ) -> Option<SensedSurfaces> {
        let origin = world.get_translation(body)?;
        let mut sensed = SensedSurfaces::default();

        // Ground: sweep a slightly shrunken sphere straight down. The shrink
        // keeps the sweep from snagging walls the capsule is flush against.
        if let Some(hit) = world.sweep_sphere(
            origin,
            Vector3::new(0.0, -1.0, 0.0),
            capsule_radius * consts::GROUND_SWEEP_RADIUS_SCALE,
            consts::GROUND_SWEEP_DISTANCE,
            body,
        ) {
            sensed.ground_distance = origin.y - hit.point.y - capsule_half_height;
            sensed.ground_normal = hit.normal;
        }

        // Wall: find the closest blocking surface within reach, then refine
        // with a line trace toward it. The trace gives a face normal where
        // the closest-point query could report an edge.
        let reach = capsule_radius + self.wall_near_distance;
        if let Some(surface) = world.closest_surface_point(origin, reach, body) {
            let mut to_wall = surface - origin;
            to_wall.y = 0.0;
            let horizontal_dist = to_wall.norm();
            if horizontal_dist > physics::NORMALIZE_EPSILON {
                let dir = to_wall / horizontal_dist;
                let end = origin + dir * (horizontal_dist + consts::WALL_TRACE_OVERSHOOT);
                if let Some(hit) = world.line_trace(origin, end, body) {
                    let mut normal = hit.normal;
                    normal.y = 0.0;
                    let len = normal.norm();
                    if len > physics::NORMALIZE_EPSILON {
                        sensed.wall_normal = normal / len;
                        sensed.wall_point = hit.point;
                        let mut delta = hit.point - origin;
                        delta.y = 0.0;
                        sensed.wall_distance = (delta.norm() - capsule_radius).max(0.0);
                    }
                }
            }
        }

        Some(sensed)
    }
}
