//! Movement and physics default constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics world defaults
pub mod physics {
    /// Fixed timestep for physics substeps (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// World gravity applied to free dynamic bodies (cm/s²). The character
    /// capsule has gravity scale 0 and integrates its own gravity instead.
    pub const WORLD_GRAVITY: f32 = 980.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;

    /// Epsilon used when normalizing direction vectors
    pub const NORMALIZE_EPSILON: f32 = 1.0e-4;

    /// Sentinel distance reported when a probe finds nothing
    pub const NO_HIT_DISTANCE: f32 = 9999.0;
}

/// Locomotion defaults (centimeters / seconds / degrees)
pub mod movement {
    pub const GRAVITY: f32 = 15.0;
    pub const GROUND_ACCELERATION: f32 = 4500.0;
    pub const GROUND_DECELERATION: f32 = 4500.0;
    pub const MAX_SLOPE_ANGLE: f32 = 40.0;
    pub const STICK_TO_GROUND_FORCE: f32 = 15.0;

    pub const JUMP_FORCE: f32 = 700.0;
    /// Buffer window for early jump presses (slide hopping)
    pub const SLIDE_HOP_WINDOW: f32 = 0.15;

    pub const WALK_SPEED: f32 = 475.0;
    pub const RUN_SPEED: f32 = 750.0;
    pub const CROUCH_SPEED: f32 = 200.0;

    pub const SLIDE_FORCE: f32 = 1000.0;
    pub const SLIDE_DECELERATION: f32 = 500.0;
    /// Minimum horizontal speed before a crouch press arms a slide boost
    /// (midpoint of walk and run speeds).
    pub const SLIDE_BOOST_MIN_SPEED: f32 = (WALK_SPEED + RUN_SPEED) / 2.0;

    pub const AIR_SPEED: f32 = 250.0;
    pub const AIR_ACCELERATION: f32 = 2000.0;
    pub const AIR_DECELERATION: f32 = 100.0;
}

/// Wall-run defaults
pub mod wallrun {
    pub const WALL_JUMP_FORCE: f32 = 600.0;
    pub const COOLDOWN: f32 = 0.5;
    pub const STICK_TO_WALL_FORCE: f32 = 1000.0;
    /// Minimum horizontal speed to latch onto a wall
    /// (midpoint of crouch and walk speeds).
    pub const MIN_ENTRY_SPEED: f32 =
        (super::movement::CROUCH_SPEED + super::movement::WALK_SPEED) / 2.0;
    /// Falling faster than this forbids wall-run entry
    pub const MAX_FALL_SPEED: f32 = 500.0;
    /// Approach-angle window (degrees between -wallNormal and body forward)
    pub const APPROACH_ANGLE_MIN: f32 = 30.0;
    pub const APPROACH_ANGLE_MAX: f32 = 120.0;
    /// Wall-normal rotation per substep beyond which the run detaches
    pub const MAX_NORMAL_DELTA: f32 = 45.0;
    /// Angle deltas below this are numerical noise and snap to zero
    pub const NORMAL_DELTA_SNAP: f32 = 0.03;
    /// Outward velocity bias added on a forced falloff detach
    pub const FALLOFF_EXIT_BIAS: f32 = 35.0;
}

/// Geometry probe defaults
pub mod probe {
    /// Contact band: closer than this counts as standing on the ground
    pub const GROUND_CONTACT_DISTANCE: f32 = 0.1;
    /// Hysteresis band: within this the previous grounded state is preserved
    pub const NEAR_GROUND_DISTANCE: f32 = 20.0;
    /// How far beyond the capsule radius the wall probe reaches
    pub const WALL_NEAR_DISTANCE: f32 = 20.0;
    /// Closer than this (horizontally) counts as touching the wall
    pub const WALL_CONTACT_DISTANCE: f32 = 5.0;
    /// Ground sweep sphere radius as a fraction of the capsule radius
    pub const GROUND_SWEEP_RADIUS_SCALE: f32 = 0.95;
    /// Overshoot added to the refining wall line trace
    pub const WALL_TRACE_OVERSHOOT: f32 = 5.0;
    /// Max distance for the downward ground sweep
    pub const GROUND_SWEEP_DISTANCE: f32 = 9999.0;
}

/// Character body defaults
pub mod body {
    pub const PLAYER_RADIUS: f32 = 26.0;
    pub const PLAYER_HEIGHT: f32 = 172.0;
    pub const PLAYER_MASS: f32 = 1.0;
}

/// Camera / orientation defaults
pub mod camera {
    /// View mount sits this far below the capsule top
    pub const CAMERA_DEPTH: f32 = 15.0;
    pub const PITCH_SMOOTHING: f32 = 5.0;
    pub const YAW_SMOOTHING: f32 = 5.0;
    pub const ROLL_SMOOTHING: f32 = 5.0;
    pub const MOUSE_SENSITIVITY: f32 = 5.0;
    pub const MAX_PITCH: f32 = 85.0;
    /// Mouse delta to degrees-per-second scale
    pub const MOUSE_SCALE: f32 = 25.0;
}
