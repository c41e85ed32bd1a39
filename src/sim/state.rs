//! Entity types
//!
//! Ship, bullets, asteroids and UFOs. Each owns its kinematics and
//! type-specific behaviour; the world owns the collections and decides
//! when entities are created and removed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::outline::Outline;
use super::tick::TickInput;
use crate::audio::{EngineHum, LoopHandle, SoundEffect};
use crate::consts::SHIP_START_ANGLE;
use crate::tuning::{AsteroidClass, Tuning, UfoClass};
use crate::{angle_to_vec, normalize_or, vec_to_angle, wrap_position};

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing in degrees (0 = +X, clockwise on screen)
    pub angle: f32,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
    /// Seconds of remaining invulnerability
    pub invuln: f32,
    pub alive: bool,
    pub radius: f32,
}

impl Ship {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos: wrap_position(pos, tuning.width, tuning.height),
            vel: Vec2::ZERO,
            angle: SHIP_START_ANGLE,
            cooldown: 0.0,
            invuln: 0.0,
            alive: true,
            radius: tuning.ship_radius,
        }
    }

    /// Unit vector along the current facing
    pub fn facing(&self) -> Vec2 {
        angle_to_vec(self.angle)
    }

    /// Apply turn/thrust input, then friction
    pub fn control(&mut self, input: &TickInput, dt: f32, tuning: &Tuning) {
        if input.turn_left {
            self.angle -= tuning.ship_turn_speed * dt;
        }
        if input.turn_right {
            self.angle += tuning.ship_turn_speed * dt;
        }
        if input.thrust {
            self.vel += self.facing() * tuning.ship_thrust * dt;
        }
        self.vel *= tuning.ship_friction;
    }

    /// Fire a bullet from the nose if the cooldown has elapsed
    pub fn fire(&mut self, tuning: &Tuning) -> Option<Bullet> {
        if self.cooldown > 0.0 {
            return None;
        }
        let dir = self.facing();
        let pos = self.pos + dir * (self.radius + tuning.ship_muzzle_margin);
        // Muzzle velocity adds to the ship's own momentum
        let vel = self.vel + dir * tuning.ship_bullet_speed;
        self.cooldown = tuning.ship_fire_rate;
        Some(Bullet::new(pos, vel, tuning))
    }

    /// Teleport to a random spot, killing all momentum
    pub fn hyperspace<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &Tuning) {
        self.pos = Vec2::new(
            rng.random_range(0.0..tuning.width),
            rng.random_range(0.0..tuning.height),
        );
        self.vel = Vec2::ZERO;
        self.invuln = tuning.hyperspace_invuln;
    }

    /// Put the ship back at `pos` as if freshly spawned
    pub fn respawn(&mut self, pos: Vec2, invuln: f32, tuning: &Tuning) {
        *self = Self::new(pos, tuning);
        self.invuln = invuln;
    }

    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.invuln = (self.invuln - dt).max(0.0);
        self.pos = wrap_position(self.pos + self.vel * dt, tuning.width, tuning.height);
    }

    /// Hull triangle: nose, then the two rear corners
    pub fn hull(&self) -> [Vec2; 3] {
        [
            self.pos + self.facing() * self.radius,
            self.pos + angle_to_vec(self.angle + 140.0) * self.radius * 0.9,
            self.pos + angle_to_vec(self.angle - 140.0) * self.radius * 0.9,
        ]
    }

    /// Shield ring blinks at 5 Hz while invulnerable
    pub fn shield_visible(&self) -> bool {
        self.invuln > 0.0 && ((self.invuln * 10.0) as u32).is_multiple_of(2)
    }
}

/// A projectile (player or enemy, by collection membership)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left to live
    pub ttl: f32,
    pub radius: f32,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos: wrap_position(pos, tuning.width, tuning.height),
            vel,
            ttl: tuning.bullet_ttl,
            radius: tuning.bullet_radius,
        }
    }

    /// Advance; returns false once the bullet has expired
    pub fn update(&mut self, dt: f32, tuning: &Tuning) -> bool {
        self.pos = wrap_position(self.pos + self.vel * dt, tuning.width, tuning.height);
        self.ttl -= dt;
        self.ttl > 0.0
    }
}

/// Asteroid size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Sizes spawned when an asteroid of this size is split
    pub fn split(self) -> &'static [AsteroidSize] {
        match self {
            AsteroidSize::Large => &[AsteroidSize::Medium, AsteroidSize::Medium],
            AsteroidSize::Medium => &[AsteroidSize::Small, AsteroidSize::Small],
            AsteroidSize::Small => &[],
        }
    }

    pub fn class(self, tuning: &Tuning) -> AsteroidClass {
        match self {
            AsteroidSize::Large => tuning.asteroid_large,
            AsteroidSize::Medium => tuning.asteroid_medium,
            AsteroidSize::Small => tuning.asteroid_small,
        }
    }

    /// Cue played when this size breaks
    pub fn break_cue(self) -> SoundEffect {
        match self {
            AsteroidSize::Large => SoundEffect::LargeBreak,
            AsteroidSize::Medium | AsteroidSize::Small => SoundEffect::MediumBreak,
        }
    }
}

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: AsteroidSize,
    pub radius: f32,
    /// Fixed for the asteroid's lifetime
    pub outline: Outline,
}

impl Asteroid {
    pub fn new<R: Rng + ?Sized>(
        pos: Vec2,
        vel: Vec2,
        size: AsteroidSize,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let class = size.class(tuning);
        let outline = Outline::jittered(
            rng,
            class.radius,
            class.vertices,
            tuning.outline_jitter_min,
            tuning.outline_jitter_max,
        );
        Self {
            pos: wrap_position(pos, tuning.width, tuning.height),
            vel,
            size,
            radius: class.radius,
            outline,
        }
    }

    pub fn score(&self, tuning: &Tuning) -> u64 {
        self.size.class(tuning).score
    }

    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        self.pos = wrap_position(self.pos + self.vel * dt, tuning.width, tuning.height);
    }
}

/// UFO size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoSize {
    Big,
    Small,
}

impl UfoSize {
    pub fn class(self, tuning: &Tuning) -> UfoClass {
        match self {
            UfoSize::Big => tuning.ufo_big,
            UfoSize::Small => tuning.ufo_small,
        }
    }

    pub fn hum(self) -> EngineHum {
        match self {
            UfoSize::Big => EngineHum::Big,
            UfoSize::Small => EngineHum::Small,
        }
    }
}

/// An enemy saucer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub pos: Vec2,
    /// Unit heading
    pub dir: Vec2,
    pub size: UfoSize,
    pub radius: f32,
    pub speed: f32,
    /// Seconds until the next shot; may dip below zero between shots
    pub shot_timer: f32,
    /// Engine loop; must be stopped whenever the UFO is removed
    #[serde(skip)]
    pub(crate) engine: Option<LoopHandle>,
}

impl Ufo {
    /// Spawn at a random point on the left or right edge with a random size
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning, target: Option<Vec2>) -> Self {
        let size = if rng.random_bool(0.5) {
            UfoSize::Small
        } else {
            UfoSize::Big
        };
        let y = rng.random_range(0.0..tuning.height);
        let x = if rng.random_bool(0.5) { 0.0 } else { tuning.width };
        Self::new(Vec2::new(x, y), size, target, tuning, rng)
    }

    pub fn new<R: Rng + ?Sized>(
        spawn: Vec2,
        size: UfoSize,
        target: Option<Vec2>,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let dir = match (size, target) {
            (UfoSize::Small, Some(target)) => {
                let mut desired = normalize_or(target - spawn, Vec2::X);
                let j = tuning.ufo_aim_jitter;
                desired.x += rng.random_range(-j..=j);
                desired.y += rng.random_range(-j..=j);
                normalize_or(desired, Vec2::X)
            }
            _ => {
                let toward_center = if spawn.x < tuning.width / 2.0 { 1.0 } else { -1.0 };
                let drift = rng.random_range(-tuning.ufo_drift..=tuning.ufo_drift);
                normalize_or(Vec2::new(toward_center, drift), Vec2::new(toward_center, 0.0))
            }
        };
        let class = size.class(tuning);
        Self {
            // Heading is decided from the raw edge point; wrap afterwards
            pos: wrap_position(spawn, tuning.width, tuning.height),
            dir,
            size,
            radius: class.radius,
            speed: class.speed,
            shot_timer: rng.random_range(0.0..1.0),
            engine: None,
        }
    }

    pub fn score(&self, tuning: &Tuning) -> u64 {
        self.size.class(tuning).score
    }

    /// Engine loop handle, if one was acquired
    pub fn engine(&self) -> Option<LoopHandle> {
        self.engine
    }

    /// Shoot if the timer allows; small UFOs aim at `target` when given
    pub fn fire<R: Rng + ?Sized>(
        &mut self,
        target: Option<Vec2>,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Option<Bullet> {
        if self.shot_timer > 0.0 {
            return None;
        }
        self.shot_timer = self.size.class(tuning).fire_delay;
        let angle = match (self.size, target) {
            (UfoSize::Small, Some(target)) => {
                let jitter = tuning.ufo_shot_jitter;
                vec_to_angle(target - self.pos) + rng.random_range(-jitter..=jitter)
            }
            _ => rng.random_range(0.0..360.0),
        };
        let dir = angle_to_vec(angle);
        let pos = self.pos + dir * (self.radius + tuning.ufo_muzzle_margin);
        Some(Bullet::new(pos, dir * tuning.ufo_bullet_speed, tuning))
    }

    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        self.pos = wrap_position(
            self.pos + self.dir * self.speed * dt,
            tuning.width,
            tuning.height,
        );
        self.shot_timer -= dt;
    }
}
