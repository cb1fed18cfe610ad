//! Character-movement simulation core.
//!
//! Two clocks drive the system. The fixed physics substep clock runs the
//! geometry probe and the movement state machine, possibly several times per
//! frame. The variable frame clock drains input once and applies orientation
//! once, no matter how many substeps the frame contained.

pub mod constants;
pub mod curve;
pub mod diagnostics;
pub mod input;
pub mod movement;
pub mod orientation;
pub mod physics;
pub mod probe;
pub mod rig;

use nalgebra::Vector3;
use rapier3d::prelude::RigidBodyHandle;

use crate::config::{MovementTuning, TuningError};

use self::diagnostics::{DiagnosticsSink, NullDiagnostics};
use self::input::{FrameInput, InputAggregator};
use self::movement::MovementStateMachine;
use self::orientation::OrientationController;
use self::physics::PhysicsWorld;
use self::probe::GeometryProbe;
use self::rig::CharacterRig;

/// One playable character: a physics body plus the four movement components,
/// constructed together and destroyed together.
pub struct Character {
    pub body: RigidBodyHandle,
    pub machine: MovementStateMachine,
    pub rig: CharacterRig,
    pub input: InputAggregator,
    pub orientation: OrientationController,
}

impl Character {
    fn spawn(world: &mut PhysicsWorld, tuning: &MovementTuning, position: [f32; 3]) -> Self {
        let rig = CharacterRig::new(tuning);
        let body = world.add_character(
            position,
            rig.scaled_radius(),
            rig.capsule_half_height(),
            tuning.player_mass,
        );
        Self {
            body,
            machine: MovementStateMachine::new(),
            rig,
            input: InputAggregator::new(),
            orientation: OrientationController::new(),
        }
    }
}

/// Owns the physics world and one character, and enforces the two-clock
/// ordering contract.
pub struct Simulation {
    pub world: PhysicsWorld,
    pub tuning: MovementTuning,
    pub character: Character,
    geometry_probe: GeometryProbe,
    diagnostics: Box<dyn DiagnosticsSink>,
    accumulator: f32,
}

impl Simulation {
    /// Builds a simulation with the character spawned at `position`.
    /// Tuning defects are surfaced here, before any stepping happens.
    pub fn new(tuning: MovementTuning, position: [f32; 3]) -> Result<Self, TuningError> {
        tuning.validate()?;
        let mut world = PhysicsWorld::new();
        let character = Character::spawn(&mut world, &tuning, position);
        let geometry_probe = GeometryProbe::new(tuning.wall_near_distance);
        Ok(Self {
            world,
            tuning,
            character,
            geometry_probe,
            diagnostics: Box::new(NullDiagnostics),
            accumulator: 0.0,
        })
    }

    pub fn set_diagnostics(&mut self, sink: Box<dyn DiagnosticsSink>) {
        self.diagnostics = sink;
    }

    /// Advances one rendered frame: drains input once, runs as many fixed
    /// substeps as the frame time covers, then applies orientation.
    pub fn advance_frame(&mut self, frame_dt: f32) {
        let frame = self.character.input.consume();
        self.character
            .machine
            .apply_frame_input(&self.tuning, &frame);

        self.accumulator += frame_dt;
        while self.accumulator >= constants::physics::TIMESTEP {
            self.accumulator -= constants::physics::TIMESTEP;
            self.substep(constants::physics::TIMESTEP, &frame);
        }

        self.character.orientation.apply_frame_rotation(
            &self.tuning,
            &mut self.world,
            self.character.body,
            &mut self.character.machine.state.pending_rotation,
            frame.mouse,
            frame_dt,
        );
    }

    /// Exactly one probe + state-machine pass, in that order, then the
    /// velocity write and the physics step.
    fn substep(&mut self, dt: f32, frame: &FrameInput) {
        let character = &mut self.character;
        if !self.world.body_exists(character.body) {
            return;
        }
        self.world.update_queries();

        let Some(sensed) = self.geometry_probe.probe(
            &self.world,
            character.body,
            character.rig.scaled_radius(),
            character.rig.capsule_half_height(),
        ) else {
            // Stale body reference: skip geometry-dependent logic for this
            // substep only.
            return;
        };

        character.machine.substep(
            &self.tuning,
            &mut self.world,
            character.body,
            &sensed,
            frame.axes,
            dt,
            self.diagnostics.as_mut(),
        );
        character.rig.tick_height(
            &self.tuning,
            &mut self.world,
            character.body,
            &mut character.machine.state,
            dt,
        );

        self.world
            .set_linear_velocity(character.body, character.machine.state.velocity);
        self.world.step(dt);
    }

    /// Body position, for tests and the sandbox readout
    pub fn character_position(&self) -> Option<Vector3<f32>> {
        self.world.get_translation(self.character.body)
    }
}
