//! Frame-clock look rotation.
//!
//! Runs once per rendered frame, outside the physics substep: integrates
//! mouse look into yaw/pitch and drains whatever rotation the movement core
//! queued up (wall-run turn-in), damped over a smoothing window.

use nalgebra::{Vector2, Vector3};
use rapier3d::prelude::RigidBodyHandle;

use crate::config::MovementTuning;

use super::constants::camera;
use super::physics::PhysicsWorld;

/// Owns the view angles. Yaw is written to the physics body so movement
/// directions follow the view; pitch and roll are presentation-only.
#[derive(Debug, Default)]
pub struct OrientationController {
    yaw: f32,
    pitch: f32,
    roll: f32,
}

impl OrientationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    pub fn roll_degrees(&self) -> f32 {
        self.roll
    }

    /// Applies one frame of look input plus the pending rotation owed by the
    /// movement core, then writes the resulting yaw to the body.
    pub fn apply_frame_rotation(
        &mut self,
        tuning: &MovementTuning,
        world: &mut PhysicsWorld,
        body: RigidBodyHandle,
        pending: &mut Vector3<f32>,
        mouse: Vector2<f32>,
        dt: f32,
    ) {
        let look = mouse * camera::MOUSE_SCALE * tuning.mouse_sensitivity * dt;
        self.yaw += look.x;
        self.pitch = (self.pitch - look.y).clamp(-camera::MAX_PITCH, camera::MAX_PITCH);

        // Drain a damped fraction of each pending axis per frame; the rest
        // carries over so imposed turns ease in rather than snap.
        self.pitch += drain_axis(&mut pending.x, tuning.camera_pitch_smoothing, dt);
        self.pitch = self.pitch.clamp(-camera::MAX_PITCH, camera::MAX_PITCH);
        self.yaw += drain_axis(&mut pending.y, tuning.camera_yaw_smoothing, dt);
        self.roll += drain_axis(&mut pending.z, tuning.camera_roll_smoothing, dt);

        world.set_body_yaw(body, self.yaw.to_radians());
    }
}

fn drain_axis(pending: &mut f32, smoothing: f32, dt: f32) -> f32 {
    let fraction = (dt * smoothing).clamp(0.0, 1.0);
    let applied = *pending * fraction;
    *pending -= applied;
    applied
}
