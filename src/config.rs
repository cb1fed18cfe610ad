//! Movement tuning parsed from movement.toml files

use serde::Deserialize;
use std::path::Path;

use crate::sim::constants::{body, camera, movement, probe, wallrun};
use crate::sim::curve::FloatCurve;

/// Externally settable movement tunables. Every value has a default matching
/// the shipped feel; a TOML file only needs to name the fields it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Downward acceleration applied while airborne (scaled by body mass)
    pub gravity: f32,
    pub ground_acceleration: f32,
    pub ground_deceleration: f32,
    /// Steeper ground than this (degrees from horizontal) is not walkable
    pub max_slope_angle: f32,
    pub stick_to_ground_force: f32,

    pub jump_force: f32,
    /// Seconds an early jump press stays buffered before landing
    pub slide_hop_window: f32,

    pub walk_speed: f32,
    pub run_speed: f32,
    pub crouch_speed: f32,

    pub slide_force: f32,
    pub slide_deceleration: f32,
    /// Horizontal speed required before a crouch press arms a slide boost
    pub slide_boost_min_speed: f32,

    pub air_speed: f32,
    pub air_acceleration: f32,
    pub air_deceleration: f32,

    pub wall_jump_force: f32,
    /// Seconds after leaving a wall before another wall-run may begin
    pub wall_run_cooldown: f32,
    pub stick_to_wall_force: f32,
    pub wallrun_min_entry_speed: f32,
    /// Falling faster than this (cm/s downward) forbids wall-run entry
    pub wallrun_max_fall_speed: f32,
    /// Accepted approach-angle window between -wallNormal and body forward
    pub approach_angle_min: f32,
    pub approach_angle_max: f32,

    pub ground_contact_distance: f32,
    pub near_ground_distance: f32,
    pub wall_near_distance: f32,
    pub wall_contact_distance: f32,

    pub player_radius: f32,
    pub player_height: f32,
    pub player_mass: f32,

    pub camera_depth: f32,
    pub camera_pitch_smoothing: f32,
    pub camera_yaw_smoothing: f32,
    pub camera_roll_smoothing: f32,
    pub mouse_sensitivity: f32,

    /// Capsule height multiplier over the crouch timeline (1.0 = standing)
    pub crouch_height_curve: FloatCurve,
    /// Time domain of this curve bounds the wall-run duration
    pub wallrun_falloff_curve: FloatCurve,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            gravity: movement::GRAVITY,
            ground_acceleration: movement::GROUND_ACCELERATION,
            ground_deceleration: movement::GROUND_DECELERATION,
            max_slope_angle: movement::MAX_SLOPE_ANGLE,
            stick_to_ground_force: movement::STICK_TO_GROUND_FORCE,
            jump_force: movement::JUMP_FORCE,
            slide_hop_window: movement::SLIDE_HOP_WINDOW,
            walk_speed: movement::WALK_SPEED,
            run_speed: movement::RUN_SPEED,
            crouch_speed: movement::CROUCH_SPEED,
            slide_force: movement::SLIDE_FORCE,
            slide_deceleration: movement::SLIDE_DECELERATION,
            slide_boost_min_speed: movement::SLIDE_BOOST_MIN_SPEED,
            air_speed: movement::AIR_SPEED,
            air_acceleration: movement::AIR_ACCELERATION,
            air_deceleration: movement::AIR_DECELERATION,
            wall_jump_force: wallrun::WALL_JUMP_FORCE,
            wall_run_cooldown: wallrun::COOLDOWN,
            stick_to_wall_force: wallrun::STICK_TO_WALL_FORCE,
            wallrun_min_entry_speed: wallrun::MIN_ENTRY_SPEED,
            wallrun_max_fall_speed: wallrun::MAX_FALL_SPEED,
            approach_angle_min: wallrun::APPROACH_ANGLE_MIN,
            approach_angle_max: wallrun::APPROACH_ANGLE_MAX,
            ground_contact_distance: probe::GROUND_CONTACT_DISTANCE,
            near_ground_distance: probe::NEAR_GROUND_DISTANCE,
            wall_near_distance: probe::WALL_NEAR_DISTANCE,
            wall_contact_distance: probe::WALL_CONTACT_DISTANCE,
            player_radius: body::PLAYER_RADIUS,
            player_height: body::PLAYER_HEIGHT,
            player_mass: body::PLAYER_MASS,
            camera_depth: camera::CAMERA_DEPTH,
            camera_pitch_smoothing: camera::PITCH_SMOOTHING,
            camera_yaw_smoothing: camera::YAW_SMOOTHING,
            camera_roll_smoothing: camera::ROLL_SMOOTHING,
            mouse_sensitivity: camera::MOUSE_SENSITIVITY,
            crouch_height_curve: FloatCurve::from_keys(&[(0.0, 1.0), (0.2, 0.5)]),
            wallrun_falloff_curve: FloatCurve::from_keys(&[(0.0, 1.0), (2.0, 0.0)]),
        }
    }
}

impl MovementTuning {
    /// Load movement tuning from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TuningError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TuningError::IoError(path.to_path_buf(), e))?;

        let mut tuning: Self =
            toml::from_str(&content).map_err(|e| TuningError::ParseError(path.to_path_buf(), e))?;
        tuning.crouch_height_curve.normalize();
        tuning.wallrun_falloff_curve.normalize();
        Ok(tuning)
    }

    /// Surface configuration defects at startup. A missing curve is reported
    /// here; at runtime the affected feature is skipped, not recovered.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.player_radius <= 0.0 || self.player_height <= 2.0 * self.player_radius {
            return Err(TuningError::InvalidValue(
                "player_height must exceed twice player_radius",
            ));
        }
        if self.player_mass <= 0.0 {
            return Err(TuningError::InvalidValue("player_mass must be positive"));
        }
        if self.crouch_height_curve.is_empty() {
            return Err(TuningError::MissingCurve("crouch_height_curve"));
        }
        if self.wallrun_falloff_curve.is_empty() {
            return Err(TuningError::MissingCurve("wallrun_falloff_curve"));
        }
        if self.approach_angle_min >= self.approach_angle_max {
            return Err(TuningError::InvalidValue(
                "approach_angle_min must be below approach_angle_max",
            ));
        }
        Ok(())
    }

    /// Standing capsule half height (total, hemispheres included)
    pub fn standing_half_height(&self) -> f32 {
        self.player_height / 2.0
    }
}

/// Errors that can occur when loading movement tuning
#[derive(Debug)]
pub enum TuningError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
    MissingCurve(&'static str),
    InvalidValue(&'static str),
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            TuningError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            TuningError::MissingCurve(name) => {
                write!(f, "Tuning curve '{}' has no keys", name)
            }
            TuningError::InvalidValue(reason) => write!(f, "Invalid tuning value: {}", reason),
        }
    }
}

impl std::error::Error for TuningError {}
