//! Capsule sizing and crouch height easing.

use nalgebra::Vector3;
use rapier3d::prelude::RigidBodyHandle;

use crate::config::MovementTuning;

use super::constants::physics;
use super::movement::MovementState;
use super::physics::PhysicsWorld;

/// Owns the character capsule dimensions and the camera mount offset.
pub struct CharacterRig {
    radius: f32,
    /// Current total capsule half height, hemisphere caps included
    half_height: f32,
    camera_depth: f32,
}

impl CharacterRig {
    pub fn new(tuning: &MovementTuning) -> Self {
        Self {
            radius: tuning.player_radius,
            half_height: tuning.standing_half_height(),
            camera_depth: tuning.camera_depth,
        }
    }

    pub fn scaled_radius(&self) -> f32 {
        self.radius
    }

    pub fn capsule_half_height(&self) -> f32 {
        self.half_height
    }

    /// Camera mount height above the capsule center
    pub fn camera_mount_height(&self) -> f32 {
        self.half_height - self.camera_depth
    }

    /// Advances the crouch timeline toward the target implied by the crouch
    /// flag and resizes the capsule from the height curve. The body gets a
    /// compensating vertical translation so the feet stay planted while the
    /// center moves.
    pub fn tick_height(
        &mut self,
        tuning: &MovementTuning,
        world: &mut PhysicsWorld,
        body: RigidBodyHandle,
        state: &mut MovementState,
        dt: f32,
    ) {
        let curve = &tuning.crouch_height_curve;
        if curve.is_empty() {
            // Configuration defect reported at startup; the feature is
            // skipped at runtime, not recovered.
            return;
        }

        let (min_time, max_time) = curve.time_range();
        let step = if state.crouch_held { dt } else { -dt };
        let param = (state.crouch_ease_param + step).clamp(min_time, max_time);
        if param == state.crouch_ease_param {
            return;
        }
        state.crouch_ease_param = param;

        let target_half = tuning.player_height * curve.value_at(param) / 2.0;
        let delta = target_half - self.half_height;
        if delta.abs() < physics::EPSILON {
            return;
        }
        world.set_capsule_half_height(body, self.radius, target_half);
        world.add_translation(body, Vector3::new(0.0, delta, 0.0));
        self.half_height = target_half;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    fn setup() -> (MovementTuning, PhysicsWorld, RigidBodyHandle, CharacterRig) {
        let tuning = MovementTuning::default();
        let mut world = PhysicsWorld::new();
        world.add_static_box(
            [0.0, -50.0, 0.0],
            UnitQuaternion::identity(),
            [2000.0, 100.0, 2000.0],
        );
        let body = world.add_character(
            [0.0, 86.0, 0.0],
            tuning.player_radius,
            tuning.standing_half_height(),
            tuning.player_mass,
        );
        let rig = CharacterRig::new(&tuning);
        (tuning, world, body, rig)
    }

    #[test]
    fn test_crouch_eases_to_half_height() {
        let (tuning, mut world, body, mut rig) = setup();
        let mut state = MovementState::default();
        state.crouch_held = true;

        // Default curve runs 0..0.2 ending at multiplier 0.5.
        let dt = 1.0 / 60.0;
        for _ in 0..20 {
            rig.tick_height(&tuning, &mut world, body, &mut state, dt);
        }
        assert_eq!(state.crouch_ease_param, 0.2);
        assert!((rig.capsule_half_height() - 43.0).abs() < 0.01);

        // Center dropped by the height delta so the feet stayed planted.
        let y = world.get_translation(body).unwrap().y;
        assert!((y - 43.0).abs() < 0.01, "got {}", y);
    }

    #[test]
    fn test_half_height_is_continuous_over_timeline() {
        let (tuning, mut world, body, mut rig) = setup();
        let mut state = MovementState::default();
        state.crouch_held = true;

        let dt = 1.0 / 60.0;
        let mut last = rig.capsule_half_height();
        // Max per-step change: height * max curve slope * dt.
        let max_step = tuning.player_height * 2.5 * dt / 2.0 + 0.01;
        for _ in 0..30 {
            rig.tick_height(&tuning, &mut world, body, &mut state, dt);
            let half = rig.capsule_half_height();
            assert!((half - last).abs() <= max_step, "jump from {} to {}", last, half);
            last = half;
        }

        // Release eases back up and the timeline never leaves the domain.
        state.crouch_held = false;
        for _ in 0..30 {
            rig.tick_height(&tuning, &mut world, body, &mut state, dt);
            assert!(state.crouch_ease_param >= 0.0 && state.crouch_ease_param <= 0.2);
        }
        assert_eq!(state.crouch_ease_param, 0.0);
        assert!((rig.capsule_half_height() - 86.0).abs() < 0.01);
    }

    #[test]
    fn test_camera_mount_follows_capsule() {
        let (tuning, mut world, body, mut rig) = setup();
        assert!((rig.camera_mount_height() - 71.0).abs() < 1e-4);

        let mut state = MovementState::default();
        state.crouch_held = true;
        for _ in 0..20 {
            rig.tick_height(&tuning, &mut world, body, &mut state, 1.0 / 60.0);
        }
        assert!((rig.camera_mount_height() - 28.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_curve_skips_easing() {
        let (mut tuning, mut world, body, mut rig) = setup();
        tuning.crouch_height_curve = crate::sim::curve::FloatCurve::from_keys(&[]);
        let mut state = MovementState::default();
        state.crouch_held = true;

        rig.tick_height(&tuning, &mut world, body, &mut state, 0.1);
        assert_eq!(state.crouch_ease_param, 0.0);
        assert_eq!(rig.capsule_half_height(), 86.0);
    }
}
