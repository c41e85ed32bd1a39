//! Data-driven game balance
//!
//! Loaded once at startup and handed to the world by value; entities borrow
//! it for every constant they need. Every field defaults to the matching
//! value in [`crate::consts`], so a tuning file only has to name the keys it
//! overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Per-size asteroid balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidClass {
    pub radius: f32,
    pub score: u64,
    /// Outline vertex count
    pub vertices: usize,
}

/// Per-size UFO balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UfoClass {
    pub radius: f32,
    pub speed: f32,
    /// Seconds between shots
    pub fire_delay: f32,
    pub score: u64,
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub width: f32,
    pub height: f32,

    // === Ship ===
    pub ship_radius: f32,
    pub ship_turn_speed: f32,
    pub ship_thrust: f32,
    pub ship_friction: f32,
    pub ship_fire_rate: f32,
    pub ship_bullet_speed: f32,
    pub ship_muzzle_margin: f32,
    pub hyperspace_invuln: f32,

    // === Bullets ===
    pub bullet_radius: f32,
    pub bullet_ttl: f32,
    pub max_bullets: usize,

    // === Asteroids ===
    pub asteroid_speed_min: f32,
    pub asteroid_speed_max: f32,
    pub split_speed_boost: f32,
    pub outline_jitter_min: f32,
    pub outline_jitter_max: f32,
    pub asteroid_large: AsteroidClass,
    pub asteroid_medium: AsteroidClass,
    pub asteroid_small: AsteroidClass,

    // === Lives & waves ===
    pub start_lives: i32,
    pub safe_spawn_time: f32,
    pub safe_invuln: f32,
    pub wave_delay: f32,
    pub wave_base_asteroids: u32,
    pub wave_safe_distance: f32,

    // === UFOs ===
    pub ufo_spawn_every: f32,
    pub ufo_big: UfoClass,
    pub ufo_small: UfoClass,
    pub ufo_bullet_speed: f32,
    pub ufo_muzzle_margin: f32,
    pub ufo_aim_jitter: f32,
    pub ufo_shot_jitter: f32,
    pub ufo_drift: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,

            ship_radius: SHIP_RADIUS,
            ship_turn_speed: SHIP_TURN_SPEED,
            ship_thrust: SHIP_THRUST,
            ship_friction: SHIP_FRICTION,
            ship_fire_rate: SHIP_FIRE_RATE,
            ship_bullet_speed: SHIP_BULLET_SPEED,
            ship_muzzle_margin: SHIP_MUZZLE_MARGIN,
            hyperspace_invuln: HYPERSPACE_INVULN,

            bullet_radius: BULLET_RADIUS,
            bullet_ttl: BULLET_TTL,
            max_bullets: MAX_BULLETS,

            asteroid_speed_min: AST_VEL_MIN,
            asteroid_speed_max: AST_VEL_MAX,
            split_speed_boost: AST_SPLIT_SPEED_BOOST,
            outline_jitter_min: AST_JITTER_MIN,
            outline_jitter_max: AST_JITTER_MAX,
            asteroid_large: AsteroidClass {
                radius: AST_LARGE_RADIUS,
                score: AST_LARGE_SCORE,
                vertices: AST_LARGE_VERTICES,
            },
            asteroid_medium: AsteroidClass {
                radius: AST_MEDIUM_RADIUS,
                score: AST_MEDIUM_SCORE,
                vertices: AST_MEDIUM_VERTICES,
            },
            asteroid_small: AsteroidClass {
                radius: AST_SMALL_RADIUS,
                score: AST_SMALL_SCORE,
                vertices: AST_SMALL_VERTICES,
            },

            start_lives: START_LIVES,
            safe_spawn_time: SAFE_SPAWN_TIME,
            safe_invuln: SAFE_INVULN,
            wave_delay: WAVE_DELAY,
            wave_base_asteroids: WAVE_BASE_ASTEROIDS,
            wave_safe_distance: WAVE_SAFE_DISTANCE,

            ufo_spawn_every: UFO_SPAWN_EVERY,
            ufo_big: UfoClass {
                radius: UFO_BIG_RADIUS,
                speed: UFO_BIG_SPEED,
                fire_delay: UFO_BIG_FIRE_DELAY,
                score: UFO_BIG_SCORE,
            },
            ufo_small: UfoClass {
                radius: UFO_SMALL_RADIUS,
                speed: UFO_SMALL_SPEED,
                fire_delay: UFO_SMALL_FIRE_DELAY,
                score: UFO_SMALL_SCORE,
            },
            ufo_bullet_speed: UFO_BULLET_SPEED,
            ufo_muzzle_margin: UFO_MUZZLE_MARGIN,
            ufo_aim_jitter: UFO_AIM_JITTER,
            ufo_shot_jitter: UFO_SHOT_JITTER,
            ufo_drift: UFO_DRIFT,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for dumping a template file)
    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Arena centre
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("ship_radius", self.ship_radius),
            ("ship_fire_rate", self.ship_fire_rate),
            ("ship_bullet_speed", self.ship_bullet_speed),
            ("bullet_radius", self.bullet_radius),
            ("bullet_ttl", self.bullet_ttl),
            ("asteroid_speed_min", self.asteroid_speed_min),
            ("outline_jitter_min", self.outline_jitter_min),
            ("asteroid_large.radius", self.asteroid_large.radius),
            ("asteroid_medium.radius", self.asteroid_medium.radius),
            ("asteroid_small.radius", self.asteroid_small.radius),
            ("ufo_spawn_every", self.ufo_spawn_every),
            ("ufo_big.radius", self.ufo_big.radius),
            ("ufo_big.speed", self.ufo_big.speed),
            ("ufo_big.fire_delay", self.ufo_big.fire_delay),
            ("ufo_small.radius", self.ufo_small.radius),
            ("ufo_small.speed", self.ufo_small.speed),
            ("ufo_small.fire_delay", self.ufo_small.fire_delay),
            ("ufo_bullet_speed", self.ufo_bullet_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TuningError::invalid(field, format!("must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("ship_muzzle_margin", self.ship_muzzle_margin),
            ("hyperspace_invuln", self.hyperspace_invuln),
            ("safe_invuln", self.safe_invuln),
            ("wave_delay", self.wave_delay),
            ("ufo_muzzle_margin", self.ufo_muzzle_margin),
            ("ufo_shot_jitter", self.ufo_shot_jitter),
            ("ufo_drift", self.ufo_drift),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(TuningError::invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        if !(self.ship_friction > 0.0 && self.ship_friction <= 1.0) {
            return Err(TuningError::invalid(
                "ship_friction",
                format!("must be in (0, 1], got {}", self.ship_friction),
            ));
        }
        if self.asteroid_speed_max < self.asteroid_speed_min {
            return Err(TuningError::invalid(
                "asteroid_speed_max",
                "must not be below asteroid_speed_min",
            ));
        }
        if self.outline_jitter_max < self.outline_jitter_min {
            return Err(TuningError::invalid(
                "outline_jitter_max",
                "must not be below outline_jitter_min",
            ));
        }
        if !(0.0..1.0).contains(&self.ufo_aim_jitter) {
            return Err(TuningError::invalid(
                "ufo_aim_jitter",
                format!("must be in [0, 1), got {}", self.ufo_aim_jitter),
            ));
        }
        for (field, class) in [
            ("asteroid_large.vertices", self.asteroid_large),
            ("asteroid_medium.vertices", self.asteroid_medium),
            ("asteroid_small.vertices", self.asteroid_small),
        ] {
            if class.vertices < 3 {
                return Err(TuningError::invalid(field, "an outline needs at least 3 vertices"));
            }
        }
        if self.max_bullets == 0 {
            return Err(TuningError::invalid("max_bullets", "must allow at least one bullet"));
        }
        if self.start_lives < 0 {
            return Err(TuningError::invalid("start_lives", "must not be negative"));
        }
        // Edge spawns are at most half the long side away from the centre
        let reach = self.width.max(self.height) / 2.0;
        if self.wave_safe_distance >= reach {
            return Err(TuningError::invalid(
                "wave_safe_distance",
                format!("must be below {reach} to fit inside the arena"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "width": 1280.0, "max_bullets": 6 }"#)
            .expect("partial tuning should parse");
        assert_eq!(tuning.width, 1280.0);
        assert_eq!(tuning.max_bullets, 6);
        assert_eq!(tuning.height, ARENA_HEIGHT);
        assert_eq!(tuning.asteroid_large.score, AST_LARGE_SCORE);
    }

    #[test]
    fn test_rejects_inverted_speed_band() {
        let err = Tuning::from_json_str(
            r#"{ "asteroid_speed_min": 100.0, "asteroid_speed_max": 10.0 }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "asteroid_speed_max",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_radius() {
        let mut tuning = Tuning::default();
        tuning.asteroid_small.radius = -1.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_ranges_and_margins() {
        for field in [
            "ship_muzzle_margin",
            "hyperspace_invuln",
            "safe_invuln",
            "wave_delay",
            "ufo_muzzle_margin",
            "ufo_shot_jitter",
            "ufo_drift",
        ] {
            let json = format!(r#"{{ "{field}": -0.5 }}"#);
            match Tuning::from_json_str(&json) {
                Err(TuningError::Invalid { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_jitter_and_margins_are_allowed() {
        let tuning = Tuning::from_json_str(
            r#"{ "ufo_drift": 0.0, "ufo_shot_jitter": 0.0, "wave_delay": 0.0 }"#,
        )
        .expect("zero is a valid band");
        assert_eq!(tuning.ufo_drift, 0.0);
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = Tuning::from_json_str("{ width: ").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_round_trips_through_json() {
        let json = Tuning::default().to_json_pretty().expect("serialize");
        let back = Tuning::from_json_str(&json).expect("parse");
        assert_eq!(back, Tuning::default());
    }
}
