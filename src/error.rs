//! Error types
//!
//! Nothing inside the simulation loop fails at runtime; every in-game
//! condition has a silent in-band policy. The only errors are loading a bad
//! tuning file and invariant violations, which are defects caught by tests
//! and debug assertions.

use thiserror::Error;

/// Failure to load or accept a [`crate::Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl TuningError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Which collection an offending entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Ship,
    PlayerBullet,
    EnemyBullet,
    Asteroid,
    Ufo,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ship => "ship",
            Self::PlayerBullet => "player bullet",
            Self::EnemyBullet => "enemy bullet",
            Self::Asteroid => "asteroid",
            Self::Ufo => "ufo",
        };
        f.write_str(name)
    }
}

/// A broken world invariant
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("{kind} #{index} at ({x}, {y}) is outside the arena")]
    EntityOutOfBounds {
        kind: EntityKind,
        index: usize,
        x: f32,
        y: f32,
    },

    #[error("{kind} #{index} has non-positive radius {radius}")]
    NonPositiveRadius {
        kind: EntityKind,
        index: usize,
        radius: f32,
    },

    #[error("lives went negative ({lives}) without a reset")]
    NegativeLives { lives: i32 },

    #[error("{kind} #{index} has ttl {ttl} outside (0, {max}]")]
    BulletTtlOutOfRange {
        kind: EntityKind,
        index: usize,
        ttl: f32,
        max: f32,
    },

    #[error("{active} engine loops active but only {owned} held by ufos")]
    LeakedEngineLoops { active: usize, owned: usize },
}
