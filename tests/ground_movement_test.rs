//! Grounded locomotion through the full simulation loop.

use nalgebra::UnitQuaternion;

use freerun::config::MovementTuning;
use freerun::sim::movement::MoveMode;
use freerun::sim::Simulation;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Flat floor with its top surface at Y=0, character standing on it.
fn grounded_sim() -> Simulation {
    let tuning = MovementTuning::default();
    let mut sim = Simulation::new(tuning, [0.0, 86.5, 0.0]).unwrap();
    sim.world.add_static_box(
        [0.0, -50.0, 0.0],
        UnitQuaternion::identity(),
        [20000.0, 100.0, 20000.0],
    );
    sim.world.update_queries();
    // Settle onto the floor.
    for _ in 0..30 {
        sim.advance_frame(FRAME_DT);
    }
    sim
}

fn horizontal_speed(sim: &Simulation) -> f32 {
    let v = sim.character.machine.state.velocity;
    (v.x * v.x + v.z * v.z).sqrt()
}

#[test]
fn test_walk_reaches_walk_speed_and_stays_grounded() {
    let mut sim = grounded_sim();

    for _ in 0..60 {
        sim.character.input.set_axes(1.0, 0.0);
        sim.advance_frame(FRAME_DT);
    }
    let speed = horizontal_speed(&sim);
    assert!(
        (speed - sim.tuning.walk_speed).abs() < 5.0,
        "expected ~walk speed, got {}",
        speed
    );
    assert_eq!(sim.character.machine.state.mode, MoveMode::Grounded);
    assert!(sim.character.machine.state.grounded);
}

#[test]
fn test_sprint_reaches_run_speed_forward_only() {
    let mut sim = grounded_sim();
    sim.character.input.press_sprint();
    for _ in 0..90 {
        sim.character.input.set_axes(1.0, 0.0);
        sim.advance_frame(FRAME_DT);
    }
    let speed = horizontal_speed(&sim);
    assert!(
        (speed - sim.tuning.run_speed).abs() < 5.0,
        "expected ~run speed, got {}",
        speed
    );

    // Sprint only applies with a forward component; strafing falls back
    // to walk speed.
    for _ in 0..90 {
        sim.character.input.set_axes(0.0, 1.0);
        sim.advance_frame(FRAME_DT);
    }
    let speed = horizontal_speed(&sim);
    assert!(
        (speed - sim.tuning.walk_speed).abs() < 5.0,
        "strafe should cap at walk speed, got {}",
        speed
    );
}

#[test]
fn test_slide_boost_then_decay() {
    let mut sim = grounded_sim();
    sim.character.input.press_sprint();
    for _ in 0..90 {
        sim.character.input.set_axes(1.0, 0.0);
        sim.advance_frame(FRAME_DT);
    }
    assert!(horizontal_speed(&sim) > sim.tuning.slide_boost_min_speed);

    // Crouching at sprint speed arms and spends a slide boost.
    sim.character.input.press_crouch();
    sim.character.input.set_axes(1.0, 0.0);
    sim.advance_frame(FRAME_DT);
    let boosted = horizontal_speed(&sim);
    assert!(
        (boosted - sim.tuning.slide_force).abs() < 30.0,
        "expected boost to ~{}, got {}",
        sim.tuning.slide_force,
        boosted
    );
    assert!(!sim.character.machine.state.sprint_active, "boost drops the sprint latch");

    // The slide bleeds speed while crouch is held; input is ignored.
    for _ in 0..30 {
        sim.advance_frame(FRAME_DT);
    }
    let later = horizontal_speed(&sim);
    assert!(later < boosted - 200.0, "slide must decelerate, got {}", later);
}

#[test]
fn test_crouch_walk_caps_at_crouch_speed() {
    let mut sim = grounded_sim();
    sim.character.input.press_crouch();
    for _ in 0..60 {
        sim.character.input.set_axes(1.0, 0.0);
        sim.advance_frame(FRAME_DT);
    }
    let speed = horizontal_speed(&sim);
    assert!(
        (speed - sim.tuning.crouch_speed).abs() < 5.0,
        "expected ~crouch speed, got {}",
        speed
    );
}

#[test]
fn test_idle_character_rests() {
    let mut sim = grounded_sim();
    for _ in 0..60 {
        sim.advance_frame(FRAME_DT);
    }
    assert!(horizontal_speed(&sim) < 1.0);
    assert_eq!(sim.character.machine.state.mode, MoveMode::Grounded);
    // Still standing on the floor, not sinking through it.
    let y = sim.character_position().unwrap().y;
    assert!((y - 86.0).abs() < 2.0, "resting height drifted to {}", y);
}
