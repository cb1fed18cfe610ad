//! The per-substep movement state machine.
//!
//! Every physics substep reads the sensed surfaces and the frame's drained
//! input, picks a movement mode, and blends velocity toward a mode-specific
//! target under acceleration caps. Timers (jump buffer, wall-run duration,
//! wall-run cooldown) are plain decrementing floats inspected each step.

use nalgebra::{Vector2, Vector3};
use rapier3d::prelude::RigidBodyHandle;

use crate::config::MovementTuning;

use super::constants::{physics, wallrun};
use super::diagnostics::DiagnosticsSink;
use super::physics::PhysicsWorld;
use super::probe::SensedSurfaces;

const DIAG_TAG: &str = "Movement";

/// Mutually exclusive movement modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    Grounded,
    Airborne,
    WallRunning,
}

/// Which side of the character the wall is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

/// Wall-run bookkeeping. `active` implies `mode == WallRunning`; a nonzero
/// cooldown forbids re-entry regardless of geometry.
#[derive(Debug, Clone)]
pub struct WallRunState {
    pub active: bool,
    pub side: WallSide,
    /// Seconds spent on the current wall
    pub elapsed: f32,
    pub cooldown: f32,
    /// Wall normal from the previous substep, for turn continuity
    pub previous_wall_normal: Vector3<f32>,
    /// Horizontal speed captured at entry, held for the whole run
    pub cruise_speed: f32,
}

impl Default for WallRunState {
    fn default() -> Self {
        Self {
            active: false,
            side: WallSide::Left,
            elapsed: 0.0,
            cooldown: 0.0,
            previous_wall_normal: Vector3::zeros(),
            cruise_speed: 0.0,
        }
    }
}

/// All mutable movement state. Created once at spawn, mutated only during a
/// substep, authoritative once written back to the physics body.
#[derive(Debug, Clone)]
pub struct MovementState {
    pub velocity: Vector3<f32>,
    pub mode: MoveMode,
    /// Derived each substep with hysteresis; distinct from `mode` so a
    /// near-ground grace window can preserve grounded behavior
    pub grounded: bool,
    pub jump_requested: bool,
    pub jump_buffer_timer: f32,
    pub crouch_held: bool,
    /// Timeline parameter for the crouch height curve
    pub crouch_ease_param: f32,
    pub sprint_active: bool,
    /// Armed by a crouch press at speed; spent on the next grounded slide
    pub slide_boost_armed: bool,
    pub wall_run: WallRunState,
    /// Rotation owed to the presentation layer (pitch, yaw, roll degrees),
    /// drained additively by the orientation controller each frame
    pub pending_rotation: Vector3<f32>,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            velocity: Vector3::zeros(),
            mode: MoveMode::Grounded,
            grounded: true,
            jump_requested: false,
            jump_buffer_timer: 0.0,
            crouch_held: false,
            crouch_ease_param: 0.0,
            sprint_active: false,
            slide_boost_armed: false,
            wall_run: WallRunState::default(),
            pending_rotation: Vector3::zeros(),
        }
    }
}

pub struct MovementStateMachine {
    pub state: MovementState,
}

impl MovementStateMachine {
    pub fn new() -> Self {
        Self {
            state: MovementState::default(),
        }
    }

    /// Latches this frame's action edges into persistent state. Called once
    /// per frame, before any substep runs.
    pub fn apply_frame_input(
        &mut self,
        tuning: &MovementTuning,
        input: &super::input::FrameInput,
    ) {
        let state = &mut self.state;
        if input.jump_pressed {
            state.jump_requested = true;
            state.jump_buffer_timer = tuning.slide_hop_window;
        }
        if input.sprint_pressed {
            state.sprint_active = true;
        }
        if input.sprint_released {
            state.sprint_active = false;
        }
        // The held flag mirrors the key outright; only the edges carry
        // boost bookkeeping.
        state.crouch_held = input.crouch_held;
        if input.crouch_pressed {
            // A grounded crouch press at speed arms a slide boost, spent on
            // the next slide tick. A midair press never arms one.
            if state.grounded
                && horizontal(state.velocity).norm() > tuning.slide_boost_min_speed
            {
                state.slide_boost_armed = true;
            }
        }
        if input.crouch_released {
            state.slide_boost_armed = false;
        }
    }

    /// One state-machine pass. The caller guarantees the body handle is live
    /// and `sensed` was probed from the current world state.
    pub fn substep(
        &mut self,
        tuning: &MovementTuning,
        world: &mut PhysicsWorld,
        body: RigidBodyHandle,
        sensed: &SensedSurfaces,
        axes: Vector2<f32>,
        dt: f32,
        diag: &mut dyn DiagnosticsSink,
    ) {
        let Some(current_velocity) = world.get_linear_velocity(body) else {
            return;
        };
        let Some(rotation) = world.get_rotation(body) else {
            return;
        };
        // Collision response since the last write is authoritative.
        self.state.velocity = current_velocity;

        let forward = rotation * Vector3::new(0.0, 0.0, -1.0);
        let right = rotation * Vector3::x();

        self.tick_timers(dt);
        self.refresh_grounded(tuning, sensed);

        let was_mode = self.state.mode;
        if self.state.wall_run.active {
            self.wall_run_move(tuning, sensed, forward, dt, diag);
        } else if self.state.grounded {
            if self.state.jump_requested {
                self.jump(tuning, world, body, sensed, diag);
            } else {
                self.state.mode = MoveMode::Grounded;
                self.ground_move(tuning, sensed, forward, right, axes, dt);
                // Only press into the slope when riding the hysteresis band;
                // firm contact needs no help.
                if sensed.ground_distance > tuning.ground_contact_distance {
                    self.stick_to_ground(tuning, sensed, dt);
                }
            }
        } else if self.should_start_wall_run(tuning, sensed, forward) {
            self.enter_wall_run(world, body, sensed, right, diag);
            self.wall_run_move(tuning, sensed, forward, dt, diag);
        } else {
            self.state.mode = MoveMode::Airborne;
            self.apply_gravity(tuning, world, body, dt);
            self.air_move(tuning, forward, right, axes, dt);
        }

        if self.state.mode != was_mode {
            diag.emit(
                DIAG_TAG,
                &format!("mode {:?} -> {:?}", was_mode, self.state.mode),
            );
        }
    }

    fn tick_timers(&mut self, dt: f32) {
        let state = &mut self.state;
        if state.jump_requested {
            state.jump_buffer_timer = (state.jump_buffer_timer - dt).max(0.0);
            if state.jump_buffer_timer <= 0.0 {
                state.jump_requested = false;
            }
        }
        state.wall_run.cooldown = (state.wall_run.cooldown - dt).max(0.0);
    }

    /// Grounded when in the contact band on a walkable slope; contact with
    /// steeper ground un-grounds outright. The near-ground band only keeps
    /// the previous answer in the no-contact case, so small bumps do not
    /// flicker the flag.
    fn refresh_grounded(&mut self, tuning: &MovementTuning, sensed: &SensedSurfaces) {
        if sensed.ground_distance < tuning.ground_contact_distance {
            self.state.grounded = sensed.slope_angle() <= tuning.max_slope_angle;
        } else if sensed.ground_distance >= tuning.near_ground_distance {
            self.state.grounded = false;
        }
    }

    fn ground_move(
        &mut self,
        tuning: &MovementTuning,
        sensed: &SensedSurfaces,
        forward: Vector3<f32>,
        right: Vector3<f32>,
        axes: Vector2<f32>,
        dt: f32,
    ) {
        let state = &mut self.state;
        let input_dir = input_direction(forward, right, axes);
        let speed = horizontal(state.velocity).norm();
        let sliding = state.crouch_held && speed > tuning.walk_speed;

        let mut delta;
        if sliding
            && state.slide_boost_armed
            && speed < tuning.slide_force
            && input_dir.norm() > physics::NORMALIZE_EPSILON
        {
            // Slide boost: instant, unclamped, and it drops the sprint latch
            // so the post-slide speed decays back to walk.
            state.slide_boost_armed = false;
            state.sprint_active = false;
            let target = input_dir * tuning.slide_force;
            delta = target - state.velocity;
        } else {
            let (target, accel) = if sliding {
                // Slides ignore input and bleed off toward rest.
                (Vector3::zeros(), tuning.slide_deceleration)
            } else {
                let target_speed = if state.crouch_held {
                    tuning.crouch_speed
                } else if state.sprint_active && axes.x > 0.0 {
                    tuning.run_speed
                } else {
                    tuning.walk_speed
                };
                let target = input_dir * target_speed;
                let accel = if target.dot(&state.velocity) > 0.0 {
                    tuning.ground_acceleration
                } else {
                    tuning.ground_deceleration
                };
                (target, accel)
            };
            delta = clamp_magnitude(target - state.velocity, accel * dt);
        }

        // Ground movement never changes the vertical component directly;
        // the delta follows the ground plane instead.
        delta.y = 0.0;
        delta -= sensed.ground_normal * delta.dot(&sensed.ground_normal);
        state.velocity += delta;
    }

    /// Presses the character into the slope so ramps do not launch it.
    fn stick_to_ground(&mut self, tuning: &MovementTuning, sensed: &SensedSurfaces, dt: f32) {
        let speed = horizontal(self.state.velocity).norm();
        let magnitude = (tuning.stick_to_ground_force + speed / 10.0) * 100.0 * dt;
        self.state.velocity -= sensed.ground_normal * magnitude;
    }

    fn apply_gravity(
        &mut self,
        tuning: &MovementTuning,
        world: &PhysicsWorld,
        body: RigidBodyHandle,
        dt: f32,
    ) {
        let mass = world.get_mass(body).unwrap_or(tuning.player_mass);
        self.state.velocity.y -= tuning.gravity * mass * dt;
    }

    fn air_move(
        &mut self,
        tuning: &MovementTuning,
        forward: Vector3<f32>,
        right: Vector3<f32>,
        axes: Vector2<f32>,
        dt: f32,
    ) {
        let state = &mut self.state;
        let input_dir = input_direction(forward, right, axes);
        let lateral = horizontal(state.velocity);
        let accelerating = input_dir.dot(&lateral) > 0.0;

        // Accelerating keeps speed built up elsewhere (a wall-jump, a slide)
        // instead of braking to air speed.
        let target_speed = if accelerating {
            tuning.air_speed.max(lateral.norm())
        } else {
            tuning.air_speed
        };
        let accel = if accelerating {
            tuning.air_acceleration
        } else {
            tuning.air_deceleration
        };

        let target = input_dir * target_speed;
        let mut delta = clamp_magnitude(target - state.velocity, accel * dt);
        delta.y = 0.0;
        state.velocity += delta;
    }

    fn jump(
        &mut self,
        tuning: &MovementTuning,
        world: &mut PhysicsWorld,
        body: RigidBodyHandle,
        sensed: &SensedSurfaces,
        diag: &mut dyn DiagnosticsSink,
    ) {
        // Lift clear of the contact band first, otherwise the next ground
        // test re-grounds the jump in the same frame. A negative measured
        // distance (capsule curvature overlap) adds to the lift.
        let mut lift = tuning.ground_contact_distance;
        if sensed.ground_distance < 0.0 {
            lift -= sensed.ground_distance;
        }
        world.add_translation(body, Vector3::new(0.0, lift, 0.0));

        self.state.velocity.y = tuning.jump_force;
        self.state.grounded = false;
        self.state.jump_requested = false;
        self.state.jump_buffer_timer = 0.0;
        self.state.mode = MoveMode::Airborne;
        diag.emit(DIAG_TAG, "jump");
    }

    fn should_start_wall_run(
        &self,
        tuning: &MovementTuning,
        sensed: &SensedSurfaces,
        forward: Vector3<f32>,
    ) -> bool {
        let state = &self.state;
        if state.wall_run.cooldown > 0.0 || state.crouch_held {
            return false;
        }
        if !sensed.has_wall() || sensed.wall_distance > tuning.wall_contact_distance {
            return false;
        }
        if horizontal(state.velocity).norm() < tuning.wallrun_min_entry_speed {
            return false;
        }
        if state.velocity.y < -tuning.wallrun_max_fall_speed {
            return false;
        }
        // Approach angle between the facing direction and the into-wall
        // direction. Head-on and fully-parallel approaches are rejected.
        let into_wall = -sensed.wall_normal;
        let approach = forward
            .dot(&into_wall)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        approach >= tuning.approach_angle_min && approach <= tuning.approach_angle_max
    }

    fn enter_wall_run(
        &mut self,
        world: &PhysicsWorld,
        body: RigidBodyHandle,
        sensed: &SensedSurfaces,
        right: Vector3<f32>,
        diag: &mut dyn DiagnosticsSink,
    ) {
        let Some(origin) = world.get_translation(body) else {
            return;
        };
        let to_wall = horizontal(sensed.wall_point - origin);
        let side = if to_wall.dot(&right) >= 0.0 {
            WallSide::Right
        } else {
            WallSide::Left
        };

        let wall_run = &mut self.state.wall_run;
        wall_run.active = true;
        wall_run.side = side;
        wall_run.elapsed = 0.0;
        wall_run.previous_wall_normal = sensed.wall_normal;
        wall_run.cruise_speed = horizontal(self.state.velocity).norm();
        self.state.mode = MoveMode::WallRunning;
        diag.emit(DIAG_TAG, &format!("wallrun enter, side {:?}", side));
    }

    fn wall_run_move(
        &mut self,
        tuning: &MovementTuning,
        sensed: &SensedSurfaces,
        forward: Vector3<f32>,
        dt: f32,
        diag: &mut dyn DiagnosticsSink,
    ) {
        self.state.mode = MoveMode::WallRunning;
        self.state.wall_run.elapsed += dt;

        // The falloff curve only contributes its time domain: running past
        // the last key forces a detach with a small outward shove and a
        // longer cooldown than a voluntary exit.
        let (_, max_time) = tuning.wallrun_falloff_curve.time_range();
        if self.state.wall_run.elapsed > max_time {
            self.state.velocity.y = 0.0;
            self.state.velocity +=
                self.state.wall_run.previous_wall_normal * wallrun::FALLOFF_EXIT_BIAS;
            self.exit_wall_run(tuning.wall_run_cooldown * 3.0);
            diag.emit(DIAG_TAG, "wallrun falloff detach");
            return;
        }

        if self.state.jump_requested {
            self.wall_jump(tuning, forward, diag);
            return;
        }

        if !sensed.has_wall() || sensed.wall_distance > tuning.wall_near_distance {
            self.exit_wall_run(tuning.wall_run_cooldown);
            diag.emit(DIAG_TAG, "wallrun lost wall");
            return;
        }

        // Turn continuity: a small rotation of the wall normal is a curved
        // wall and feeds the turn into the pending rotation; a large one is
        // a different wall and the run ends.
        let normal_delta =
            signed_yaw_between(self.state.wall_run.previous_wall_normal, sensed.wall_normal);
        if normal_delta.abs() > wallrun::MAX_NORMAL_DELTA {
            self.exit_wall_run(tuning.wall_run_cooldown);
            diag.emit(DIAG_TAG, "wallrun fell off corner");
            return;
        }
        if normal_delta.abs() >= wallrun::NORMAL_DELTA_SNAP {
            self.state.pending_rotation.y += normal_delta;
        }
        self.state.wall_run.previous_wall_normal = sensed.wall_normal;

        // Cruise along the wall at the entry speed, then press inward so
        // the probe keeps contact on the next substep.
        let run_dir = match self.state.wall_run.side {
            WallSide::Left => rotate_about_up(sensed.wall_normal, 90.0),
            WallSide::Right => rotate_about_up(sensed.wall_normal, -90.0),
        };
        self.state.velocity = run_dir * self.state.wall_run.cruise_speed;
        self.state.velocity -= sensed.wall_normal * tuning.stick_to_wall_force * dt;
    }

    /// Voluntary exit: velocity is replaced outright, forward and up.
    fn wall_jump(
        &mut self,
        tuning: &MovementTuning,
        forward: Vector3<f32>,
        diag: &mut dyn DiagnosticsSink,
    ) {
        self.state.velocity =
            forward * tuning.wall_jump_force + Vector3::y() * (tuning.wall_jump_force / 2.0);
        self.exit_wall_run(tuning.wall_run_cooldown);
        diag.emit(DIAG_TAG, "wall jump");
    }

    /// Every exit path clears any buffered jump so a press spent on the wall
    /// cannot also fire a ground jump after landing.
    fn exit_wall_run(&mut self, cooldown: f32) {
        self.state.wall_run.active = false;
        self.state.wall_run.cooldown = cooldown;
        self.state.jump_requested = false;
        self.state.jump_buffer_timer = 0.0;
        self.state.mode = MoveMode::Airborne;
    }
}

impl Default for MovementStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn horizontal(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, 0.0, v.z)
}

/// Maps 2D input axes into a world-space direction on the horizontal plane
fn input_direction(forward: Vector3<f32>, right: Vector3<f32>, axes: Vector2<f32>) -> Vector3<f32> {
    let dir = horizontal(forward * axes.x + right * axes.y);
    let len = dir.norm();
    if len > physics::NORMALIZE_EPSILON {
        dir / len
    } else {
        Vector3::zeros()
    }
}

fn clamp_magnitude(v: Vector3<f32>, max: f32) -> Vector3<f32> {
    let len = v.norm();
    if len > max && len > physics::NORMALIZE_EPSILON {
        v * (max / len)
    } else {
        v
    }
}

/// Signed yaw angle in degrees carrying `from` onto `to` about the up axis
fn signed_yaw_between(from: Vector3<f32>, to: Vector3<f32>) -> f32 {
    let a = horizontal(from);
    let b = horizontal(to);
    if a.norm() < physics::NORMALIZE_EPSILON || b.norm() < physics::NORMALIZE_EPSILON {
        return 0.0;
    }
    let a = a.normalize();
    let b = b.normalize();
    let cross = a.cross(&b);
    cross.y.atan2(a.dot(&b)).to_degrees()
}

fn rotate_about_up(v: Vector3<f32>, degrees: f32) -> Vector3<f32> {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    Vector3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}
