//! Wall-running: entry gating, cruise, detach paths, and cooldown.

use nalgebra::{UnitQuaternion, Vector3};

use freerun::config::MovementTuning;
use freerun::sim::movement::{MoveMode, WallSide};
use freerun::sim::Simulation;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Airborne character beside a long wall. The wall face is at X=28, so the
/// 26cm capsule at X=0 has a 2cm gap, inside the contact band. The floor is
/// far below so ground sensing never interferes.
fn sim_beside_wall(velocity: Vector3<f32>) -> Simulation {
    let tuning = MovementTuning::default();
    let mut sim = Simulation::new(tuning, [0.0, 86.0, 0.0]).unwrap();
    sim.world.add_static_box(
        [0.0, -2000.0, 0.0],
        UnitQuaternion::identity(),
        [40000.0, 100.0, 40000.0],
    );
    sim.world.add_static_box(
        [78.0, 0.0, 0.0],
        UnitQuaternion::identity(),
        [100.0, 2000.0, 40000.0],
    );
    sim.world.update_queries();
    sim.world.set_linear_velocity(sim.character.body, velocity);
    sim
}

#[test]
fn test_entry_captures_side_and_cruise_speed() {
    let mut sim = sim_beside_wall(Vector3::new(0.0, 0.0, -400.0));
    sim.advance_frame(FRAME_DT);

    let state = &sim.character.machine.state;
    assert_eq!(state.mode, MoveMode::WallRunning);
    assert!(state.wall_run.active);
    assert_eq!(state.wall_run.side, WallSide::Right);
    assert!(
        (state.wall_run.cruise_speed - 400.0).abs() < 10.0,
        "cruise speed {}",
        state.wall_run.cruise_speed
    );
    // Cruising along the wall, not into it.
    assert!(state.velocity.z < -350.0, "velocity {:?}", state.velocity);
}

#[test]
fn test_slow_approach_does_not_latch() {
    // Below the minimum entry speed the wall is ignored.
    let mut sim = sim_beside_wall(Vector3::new(0.0, 0.0, -200.0));
    for _ in 0..10 {
        sim.advance_frame(FRAME_DT);
        assert_eq!(sim.character.machine.state.mode, MoveMode::Airborne);
    }
}

#[test]
fn test_fast_fall_does_not_latch() {
    let mut sim = sim_beside_wall(Vector3::new(0.0, -600.0, -400.0));
    sim.advance_frame(FRAME_DT);
    assert_eq!(sim.character.machine.state.mode, MoveMode::Airborne);
}

#[test]
fn test_falloff_detach_biases_away_and_triples_cooldown() {
    let mut sim = sim_beside_wall(Vector3::new(0.0, 0.0, -400.0));

    // Default falloff curve ends at t=2.0; run until the forced detach.
    let mut detached_at = None;
    for frame in 0..180 {
        sim.advance_frame(FRAME_DT);
        if sim.character.machine.state.mode != MoveMode::WallRunning {
            detached_at = Some(frame);
            break;
        }
    }
    let frame = detached_at.expect("run must end by falloff");
    let elapsed = frame as f32 * FRAME_DT;
    assert!(
        (elapsed - 2.0).abs() < 0.1,
        "detach expected near 2.0s, got {}",
        elapsed
    );

    let state = &sim.character.machine.state;
    assert!(!state.wall_run.active);
    // Triple the voluntary-exit cooldown, minus at most one tick.
    assert!(
        state.wall_run.cooldown > sim.tuning.wall_run_cooldown * 3.0 - 0.05,
        "cooldown {}",
        state.wall_run.cooldown
    );
    // Shoved away from the wall (wall normal points -X).
    assert!(state.velocity.x < -25.0, "exit bias missing: {:?}", state.velocity);
}

#[test]
fn test_wall_jump_replaces_velocity() {
    let mut sim = sim_beside_wall(Vector3::new(0.0, 0.0, -400.0));
    sim.advance_frame(FRAME_DT);
    assert_eq!(sim.character.machine.state.mode, MoveMode::WallRunning);

    sim.character.input.press_jump();
    sim.advance_frame(FRAME_DT);

    let state = &sim.character.machine.state;
    assert_eq!(state.mode, MoveMode::Airborne);
    assert!(!state.wall_run.active);
    // Replacement, not additive: forward at wall-jump force with half of it
    // straight up (facing -Z at spawn).
    let force = sim.tuning.wall_jump_force;
    assert!((state.velocity.z + force).abs() < 20.0, "velocity {:?}", state.velocity);
    assert!((state.velocity.y - force / 2.0).abs() < 20.0, "velocity {:?}", state.velocity);
    assert!(
        (state.wall_run.cooldown - sim.tuning.wall_run_cooldown).abs() < 0.05,
        "cooldown {}",
        state.wall_run.cooldown
    );
}

#[test]
fn test_cooldown_blocks_reentry_until_expired() {
    let mut sim = sim_beside_wall(Vector3::new(0.0, 0.0, -400.0));
    sim.advance_frame(FRAME_DT);
    sim.character.input.press_jump();
    sim.advance_frame(FRAME_DT);
    assert_eq!(sim.character.machine.state.mode, MoveMode::Airborne);

    // Geometry and speed conditions hold again immediately (the wall is
    // long, the capsule still hugs it), yet the cooldown gates re-entry.
    sim.world
        .set_linear_velocity(sim.character.body, Vector3::new(0.0, 0.0, -400.0));
    let cooldown_frames = (sim.tuning.wall_run_cooldown / FRAME_DT) as u32 - 2;
    for _ in 0..cooldown_frames {
        sim.advance_frame(FRAME_DT);
        assert_ne!(
            sim.character.machine.state.mode,
            MoveMode::WallRunning,
            "re-entry before cooldown expiry"
        );
        // Keep speed up and press gently into the wall while waiting.
        sim.world
            .set_linear_velocity(sim.character.body, Vector3::new(20.0, 0.0, -400.0));
    }
    for _ in 0..30 {
        sim.advance_frame(FRAME_DT);
        if sim.character.machine.state.mode == MoveMode::WallRunning {
            return;
        }
        sim.world
            .set_linear_velocity(sim.character.body, Vector3::new(20.0, 0.0, -400.0));
    }
    panic!("wall-run must be available again after cooldown");
}

#[test]
fn test_losing_the_wall_ends_the_run() {
    // Short wall: the character cruises past its end and detaches.
    let tuning = MovementTuning::default();
    let mut sim = Simulation::new(tuning, [0.0, 86.0, -50.0]).unwrap();
    sim.world.add_static_box(
        [78.0, 0.0, -150.0],
        UnitQuaternion::identity(),
        [100.0, 2000.0, 300.0],
    );
    sim.world.update_queries();
    sim.world
        .set_linear_velocity(sim.character.body, Vector3::new(0.0, 0.0, -400.0));

    sim.advance_frame(FRAME_DT);
    assert_eq!(sim.character.machine.state.mode, MoveMode::WallRunning);

    let mut ended = false;
    for _ in 0..90 {
        sim.advance_frame(FRAME_DT);
        let state = &sim.character.machine.state;
        if state.mode != MoveMode::WallRunning {
            assert!(!state.wall_run.active);
            assert!(state.wall_run.cooldown > 0.0, "exit must start the cooldown");
            ended = true;
            break;
        }
    }
    assert!(ended, "run must end when the wall runs out");
}
