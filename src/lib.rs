//! Roid Rush - wrap-around asteroids simulation core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, collisions, waves, score)
//! - `renderer`: Shape descriptors handed to an external rasterizer
//! - `audio`: Sound cue sink and UFO engine-loop handles
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors and invariant violations

pub mod audio;
pub mod error;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::{InvariantViolation, TuningError};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame time the driver will feed into the accumulator
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Arena dimensions (toroidal)
    pub const ARENA_WIDTH: f32 = 960.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 15.0;
    /// Degrees per second
    pub const SHIP_TURN_SPEED: f32 = 220.0;
    /// Pixels/s² along facing while thrusting
    pub const SHIP_THRUST: f32 = 220.0;
    /// Applied once per control call
    pub const SHIP_FRICTION: f32 = 0.995;
    /// Seconds between shots
    pub const SHIP_FIRE_RATE: f32 = 0.2;
    pub const SHIP_BULLET_SPEED: f32 = 420.0;
    /// Extra distance past the hull where player bullets appear
    pub const SHIP_MUZZLE_MARGIN: f32 = 6.0;
    /// Facing after (re)spawn; -90° points up on screen
    pub const SHIP_START_ANGLE: f32 = -90.0;
    pub const HYPERSPACE_INVULN: f32 = 1.0;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 2.0;
    pub const BULLET_TTL: f32 = 1.0;
    /// Player bullets allowed in flight at once
    pub const MAX_BULLETS: usize = 4;

    /// Asteroid defaults
    pub const AST_VEL_MIN: f32 = 30.0;
    pub const AST_VEL_MAX: f32 = 90.0;
    /// Split children are this much faster than a fresh asteroid
    pub const AST_SPLIT_SPEED_BOOST: f32 = 1.2;
    pub const AST_JITTER_MIN: f32 = 0.75;
    pub const AST_JITTER_MAX: f32 = 1.2;
    pub const AST_LARGE_RADIUS: f32 = 46.0;
    pub const AST_MEDIUM_RADIUS: f32 = 24.0;
    pub const AST_SMALL_RADIUS: f32 = 12.0;
    pub const AST_LARGE_SCORE: u64 = 20;
    pub const AST_MEDIUM_SCORE: u64 = 50;
    pub const AST_SMALL_SCORE: u64 = 100;
    pub const AST_LARGE_VERTICES: usize = 12;
    pub const AST_MEDIUM_VERTICES: usize = 10;
    pub const AST_SMALL_VERTICES: usize = 8;

    /// Lives and wave pacing
    pub const START_LIVES: i32 = 3;
    pub const SAFE_SPAWN_TIME: f32 = 2.0;
    /// Invulnerability forced on the ship every frame of the safety window
    pub const SAFE_INVULN: f32 = 0.5;
    pub const WAVE_DELAY: f32 = 2.0;
    /// Asteroids per wave = base + wave number
    pub const WAVE_BASE_ASTEROIDS: u32 = 3;
    /// New-wave asteroids never spawn closer than this to the ship
    pub const WAVE_SAFE_DISTANCE: f32 = 150.0;

    /// UFO defaults
    pub const UFO_SPAWN_EVERY: f32 = 15.0;
    pub const UFO_BIG_RADIUS: f32 = 18.0;
    pub const UFO_SMALL_RADIUS: f32 = 12.0;
    pub const UFO_BIG_SPEED: f32 = 80.0;
    pub const UFO_SMALL_SPEED: f32 = 80.0;
    pub const UFO_BIG_FIRE_DELAY: f32 = 1.2;
    pub const UFO_SMALL_FIRE_DELAY: f32 = 0.8;
    pub const UFO_BIG_SCORE: u64 = 200;
    pub const UFO_SMALL_SCORE: u64 = 1000;
    pub const UFO_BULLET_SPEED: f32 = 260.0;
    pub const UFO_MUZZLE_MARGIN: f32 = 10.0;
    /// Per-axis heading jitter for homing (small) UFOs
    pub const UFO_AIM_JITTER: f32 = 0.2;
    /// Shot angle jitter for homing UFOs, degrees either way
    pub const UFO_SHOT_JITTER: f32 = 5.0;
    /// Vertical drift range for non-homing UFOs
    pub const UFO_DRIFT: f32 = 0.5;
}

/// Unit vector for an angle in degrees (0° = +X, clockwise on a Y-down screen)
#[inline]
pub fn angle_to_vec(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle of a vector in degrees, inverse of [`angle_to_vec`]
#[inline]
pub fn vec_to_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Normalize, or return `fallback` when `v` has no usable direction
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len > f32::EPSILON && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

/// Wrap a single coordinate into `[0, extent)`
#[inline]
pub fn wrap_axis(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negatives up to exactly `extent`
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Wrap a position into the toroidal arena `[0, width) × [0, height)`
#[inline]
pub fn wrap_position(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, width), wrap_axis(pos.y, height))
}
