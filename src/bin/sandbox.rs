//! Headless movement sandbox.
//!
//! Builds a small arena (floor, a wall to run on, a ramp), drives the
//! character through a scripted input sequence, and prints a periodic
//! readout. Useful for eyeballing tuning changes without a game client.

use clap::Parser;
use nalgebra::UnitQuaternion;
use std::path::PathBuf;
use std::process;

use freerun::config::MovementTuning;
use freerun::sim::diagnostics::StderrDiagnostics;
use freerun::sim::Simulation;

#[derive(Parser)]
#[command(name = "freerun-sandbox")]
#[command(about = "Scripted run of the movement simulation", long_about = None)]
struct Cli {
    /// Movement tuning TOML file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds of simulated time to run
    #[arg(short, long, default_value_t = 8.0)]
    seconds: f32,

    /// Emit movement diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let tuning = match cli.config {
        Some(path) => match MovementTuning::from_file(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                eprintln!("[Sandbox] {}", e);
                process::exit(1);
            }
        },
        None => MovementTuning::default(),
    };

    let mut sim = match Simulation::new(tuning, [0.0, 87.0, 0.0]) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("[Sandbox] {}", e);
            process::exit(1);
        }
    };
    if cli.verbose {
        sim.set_diagnostics(Box::new(StderrDiagnostics));
    }
    build_arena(&mut sim);

    let frame_dt = 1.0 / 60.0;
    let frames = (cli.seconds / frame_dt).ceil() as u32;
    for frame in 0..frames {
        script_input(&mut sim, frame as f32 * frame_dt);
        sim.advance_frame(frame_dt);

        if frame % 30 == 0 {
            let pos = sim.character_position().unwrap_or_default();
            let state = &sim.character.machine.state;
            println!(
                "t={:5.2}  pos=({:8.1},{:7.1},{:8.1})  speed={:7.1}  mode={:?}",
                frame as f32 * frame_dt,
                pos.x,
                pos.y,
                pos.z,
                state.velocity.norm(),
                state.mode,
            );
        }
    }
}

/// Floor at Y=0, a long run-on wall beside the travel path, and a ramp.
fn build_arena(sim: &mut Simulation) {
    let world = &mut sim.world;
    world.add_static_box(
        [0.0, -50.0, 0.0],
        UnitQuaternion::identity(),
        [20000.0, 100.0, 20000.0],
    );
    // Wall face at X=120, running along -Z.
    world.add_static_box(
        [170.0, 200.0, -2000.0],
        UnitQuaternion::identity(),
        [100.0, 400.0, 4000.0],
    );
    world.add_ramp([0.0, 50.0, -5000.0], 20.0, [400.0, 20.0, 1200.0]);
    world.update_queries();
}

/// Sprint forward, slide, hop, then drift toward the wall.
fn script_input(sim: &mut Simulation, t: f32) {
    let input = &mut sim.character.input;
    input.set_axes(1.0, 0.0);
    if t < 0.02 {
        input.press_sprint();
    }
    if (2.0..2.02).contains(&t) {
        input.press_crouch();
    }
    if (2.8..2.82).contains(&t) {
        input.release_crouch();
        input.press_jump();
    }
    if t >= 4.0 {
        // Strafe into the wall to pick up a wall-run.
        input.set_axes(1.0, 0.4);
    }
    if (5.5..5.52).contains(&t) {
        input.press_jump();
    }
}
