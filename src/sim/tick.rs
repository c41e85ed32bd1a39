//! Frame stepping
//!
//! One `update` per rendered frame. The world trusts the `dt` it is given;
//! clamping pathological frame times is the caller's job.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::AsteroidSize;
use super::world::World;
use crate::audio::AudioSink;
use crate::wrap_position;

/// Input sampled once per frame
///
/// `fire` and `hyperspace` are requests: the driver sets them on the frame
/// the key goes down and clears them afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
    pub hyperspace: bool,
}

/// Resample attempts before settling for the farthest edge point
const MAX_SPAWN_ATTEMPTS: usize = 64;

/// Offset from the open right/bottom bounds for edge spawns
const EDGE_INSET: f32 = 0.5;

impl<A: AudioSink> World<A> {
    /// Advance the world by `dt` seconds
    pub fn update(&mut self, dt: f32, input: &TickInput) {
        self.frame += 1;

        if input.fire {
            self.try_fire();
        }
        if input.hyperspace {
            self.hyperspace();
        }

        // Physics
        self.ship.control(input, dt, &self.tuning);
        self.advance(dt);

        // Enemy fire
        let target = self.ship_target();
        let Self {
            ufos,
            enemy_bullets,
            tuning,
            rng,
            ..
        } = self;
        for ufo in ufos.iter_mut() {
            if let Some(bullet) = ufo.fire(Some(target), tuning, rng) {
                enemy_bullets.push(bullet);
            }
        }

        // Safety window keeps the ship invulnerable every frame it runs
        if self.safe > 0.0 {
            self.safe -= dt;
            self.ship.invuln = self.tuning.safe_invuln;
        }

        self.ufo_timer -= dt;
        if self.ufo_timer <= 0.0 {
            self.spawn_ufo();
            self.ufo_timer = self.tuning.ufo_spawn_every;
        }

        self.resolve_collisions();
        self.progress_waves(dt);

        debug_assert_eq!(self.validate_invariants(), Ok(()));
    }

    /// Integrate every entity and drop expired bullets
    fn advance(&mut self, dt: f32) {
        let tuning = &self.tuning;
        self.ship.update(dt, tuning);
        self.bullets.retain_mut(|b| b.update(dt, tuning));
        self.enemy_bullets.retain_mut(|b| b.update(dt, tuning));
        for asteroid in &mut self.asteroids {
            asteroid.update(dt, tuning);
        }
        for ufo in &mut self.ufos {
            ufo.update(dt, tuning);
        }
    }

    /// Start the next wave once the field is clear and the delay is over
    fn progress_waves(&mut self, dt: f32) {
        if !self.asteroids.is_empty() {
            return;
        }
        if self.wave_cool <= 0.0 {
            self.start_wave();
            self.wave_cool = self.tuning.wave_delay;
        } else {
            self.wave_cool -= dt;
        }
    }

    /// Spawn `base + wave` large asteroids away from the ship
    pub(crate) fn start_wave(&mut self) {
        self.wave += 1;
        let count = self.tuning.wave_base_asteroids + self.wave;
        for _ in 0..count {
            let pos = self.safe_edge_point();
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self
                .rng
                .random_range(self.tuning.asteroid_speed_min..=self.tuning.asteroid_speed_max);
            self.spawn_asteroid(pos, Vec2::from_angle(angle) * speed, AsteroidSize::Large);
        }
        log::info!("Wave {} started with {} asteroids", self.wave, count);
    }

    /// Random edge point at least the safe distance from the ship
    fn safe_edge_point(&mut self) -> Vec2 {
        let ship = self.ship.pos;
        let min_dist = self.tuning.wave_safe_distance;
        let mut best = self.random_edge_point();
        for _ in 1..MAX_SPAWN_ATTEMPTS {
            if (best - ship).length() >= min_dist {
                return best;
            }
            let candidate = self.random_edge_point();
            if (candidate - ship).length() > (best - ship).length() {
                best = candidate;
            }
        }
        log::warn!("No edge point {} away from the ship; using farthest", min_dist);
        best
    }

    /// Random point on one of the four arena edges, chosen uniformly
    ///
    /// Right and bottom edges sit just inside the open bound so the point
    /// stays on that side once wrapped.
    fn random_edge_point(&mut self) -> Vec2 {
        let (w, h) = (self.tuning.width, self.tuning.height);
        let x = self.rng.random_range(0.0..w);
        let y = self.rng.random_range(0.0..h);
        let point = match self.rng.random_range(0..4) {
            0 => Vec2::new(x, 0.0),
            1 => Vec2::new(x, h - EDGE_INSET),
            2 => Vec2::new(0.0, y),
            _ => Vec2::new(w - EDGE_INSET, y),
        };
        wrap_position(point, w, h)
    }
}
