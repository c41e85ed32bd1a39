//! World state
//!
//! Owns the ship and every entity collection, the score/lives/wave
//! bookkeeping and the seeded RNG. Frame stepping lives in `tick.rs`,
//! collision resolution in `collision.rs`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Asteroid, AsteroidSize, Bullet, Ship, Ufo};
use crate::audio::{AudioQueue, AudioSink, SoundEffect};
use crate::error::{EntityKind, InvariantViolation, TuningError};
use crate::renderer::shapes::{self, Surface};
use crate::tuning::Tuning;

/// Where the match currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Field cleared and delay elapsed; next update spawns the wave
    WaveBuilding,
    /// Asteroids on the field
    Playing,
    /// Field cleared, counting down the inter-wave delay
    WaveCleared,
}

/// Scalar values for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub lives: i32,
    pub wave: u32,
}

/// Serializable copy of everything drawable plus the HUD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub hud: Hud,
    pub phase: WavePhase,
    pub ship: Ship,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub ufos: Vec<Ufo>,
}

/// The simulation
pub struct World<A: AudioSink = AudioQueue> {
    pub(crate) tuning: Tuning,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) audio: A,

    pub(crate) ship: Ship,
    pub(crate) bullets: Vec<Bullet>,
    pub(crate) enemy_bullets: Vec<Bullet>,
    pub(crate) asteroids: Vec<Asteroid>,
    pub(crate) ufos: Vec<Ufo>,

    pub(crate) score: u64,
    pub(crate) lives: i32,
    pub(crate) wave: u32,
    /// Inter-wave delay countdown
    pub(crate) wave_cool: f32,
    /// Post-spawn safety window countdown
    pub(crate) safe: f32,
    /// Countdown to the next UFO
    pub(crate) ufo_timer: f32,
    /// Frames simulated since construction
    pub(crate) frame: u64,
}

impl World<AudioQueue> {
    /// Default tuning with the bundled audio queue
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Tuning::default(), seed, AudioQueue::new())
    }
}

impl<A: AudioSink> World<A> {
    /// Create a world and start wave 1, rejecting tuning it cannot run with
    pub fn new(tuning: Tuning, seed: u64, audio: A) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, seed, audio))
    }

    /// `tuning` must already be valid
    fn build(tuning: Tuning, seed: u64, audio: A) -> Self {
        let ship = Ship::new(tuning.center(), &tuning);
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            audio,
            ship,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            asteroids: Vec::new(),
            ufos: Vec::new(),
            score: 0,
            lives: tuning.start_lives,
            wave: 0,
            wave_cool: tuning.wave_delay,
            safe: tuning.safe_spawn_time,
            ufo_timer: tuning.ufo_spawn_every,
            frame: 0,
            tuning,
        };
        world.start_wave();
        log::info!("World created (seed {})", seed);
        world
    }

    /// Back to the initial state: score 0, starting lives, wave 1
    ///
    /// The RNG keeps running so consecutive matches differ.
    pub fn reset(&mut self) {
        for ufo in std::mem::take(&mut self.ufos) {
            if let Some(handle) = ufo.engine {
                self.audio.stop_loop(handle);
            }
        }
        self.ship = Ship::new(self.tuning.center(), &self.tuning);
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.asteroids.clear();
        self.score = 0;
        self.lives = self.tuning.start_lives;
        self.wave = 0;
        self.wave_cool = self.tuning.wave_delay;
        self.safe = self.tuning.safe_spawn_time;
        self.ufo_timer = self.tuning.ufo_spawn_every;
        self.start_wave();
        log::info!("World reset");
    }

    // === Accessors ===

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn enemy_bullets(&self) -> &[Bullet] {
        &self.enemy_bullets
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn ufos(&self) -> &[Ufo] {
        &self.ufos
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            lives: self.lives,
            wave: self.wave,
        }
    }

    pub fn phase(&self) -> WavePhase {
        if !self.asteroids.is_empty() {
            WavePhase::Playing
        } else if self.wave_cool > 0.0 {
            WavePhase::WaveCleared
        } else {
            WavePhase::WaveBuilding
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            hud: self.hud(),
            phase: self.phase(),
            ship: self.ship.clone(),
            bullets: self.bullets.clone(),
            enemy_bullets: self.enemy_bullets.clone(),
            asteroids: self.asteroids.clone(),
            ufos: self.ufos.clone(),
        }
    }

    /// Ship position when alive, arena centre otherwise
    pub(crate) fn ship_target(&self) -> Vec2 {
        if self.ship.alive {
            self.ship.pos
        } else {
            self.tuning.center()
        }
    }

    // === Spawning ===

    pub fn spawn_asteroid(&mut self, pos: Vec2, vel: Vec2, size: AsteroidSize) {
        let asteroid = Asteroid::new(pos, vel, size, &self.tuning, &mut self.rng);
        self.asteroids.push(asteroid);
    }

    /// Spawn a random UFO on the left or right edge
    pub fn spawn_ufo(&mut self) {
        let target = self.ship_target();
        let ufo = Ufo::spawn(&mut self.rng, &self.tuning, Some(target));
        log::info!("{:?} UFO entering at ({:.0}, {:.0})", ufo.size, ufo.pos.x, ufo.pos.y);
        self.insert_ufo(ufo);
    }

    /// Add a UFO and start its engine loop
    pub(crate) fn insert_ufo(&mut self, mut ufo: Ufo) {
        ufo.engine = self.audio.start_loop(ufo.size.hum());
        self.ufos.push(ufo);
    }

    /// Remove a UFO, stopping its engine loop
    pub(crate) fn despawn_ufo(&mut self, index: usize) -> Ufo {
        let mut ufo = self.ufos.remove(index);
        if let Some(handle) = ufo.engine.take() {
            self.audio.stop_loop(handle);
        }
        ufo
    }

    // === Player actions ===

    /// Fire if alive, under the bullet cap and off cooldown
    pub fn try_fire(&mut self) -> bool {
        if !self.ship.alive || self.bullets.len() >= self.tuning.max_bullets {
            return false;
        }
        let Some(bullet) = self.ship.fire(&self.tuning) else {
            return false;
        };
        self.bullets.push(bullet);
        self.audio.play(SoundEffect::ShotFired);
        true
    }

    /// Jump the ship to a random spot
    pub fn hyperspace(&mut self) {
        if !self.ship.alive {
            return;
        }
        self.ship.hyperspace(&mut self.rng, &self.tuning);
        log::debug!("Hyperspace to ({:.0}, {:.0})", self.ship.pos.x, self.ship.pos.y);
    }

    // === Destruction ===

    /// Break the asteroid at `index`, scoring it and spawning its children
    pub fn split_asteroid(&mut self, index: usize) {
        if index >= self.asteroids.len() {
            return;
        }
        let asteroid = self.asteroids.remove(index);
        self.audio.play(asteroid.size.break_cue());
        self.score += asteroid.score(&self.tuning);
        log::debug!("{:?} asteroid split (score {})", asteroid.size, self.score);

        for &size in asteroid.size.split() {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self
                .rng
                .random_range(self.tuning.asteroid_speed_min..=self.tuning.asteroid_speed_max)
                * self.tuning.split_speed_boost;
            self.spawn_asteroid(asteroid.pos, Vec2::from_angle(angle) * speed, size);
        }
    }

    /// Lose a life; respawn at centre or reset the match when out of lives
    pub fn ship_die(&mut self) {
        if !self.ship.alive {
            return;
        }
        self.audio.play(SoundEffect::Explosion);
        self.lives -= 1;
        self.ship.alive = false;

        if self.lives >= 0 {
            let safe = self.tuning.safe_spawn_time;
            self.ship.respawn(self.tuning.center(), safe, &self.tuning);
            self.safe = safe;
            log::info!("Ship destroyed, {} lives left", self.lives);
        } else {
            log::info!("Out of lives at wave {} with score {}", self.wave, self.score);
            self.reset();
        }
    }

    // === Rendering ===

    /// Push every entity's shapes into `surface`
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for asteroid in &self.asteroids {
            surface.draw(shapes::asteroid(asteroid));
        }
        for ufo in &self.ufos {
            for shape in shapes::ufo(ufo) {
                surface.draw(shape);
            }
        }
        for bullet in self.bullets.iter().chain(&self.enemy_bullets) {
            surface.draw(shapes::bullet(bullet));
        }
        if self.ship.alive {
            for shape in shapes::ship(&self.ship) {
                surface.draw(shape);
            }
        }
    }

    // === Invariants ===

    /// Check every world invariant; a failure is a bug in the simulation
    pub fn validate_invariants(&self) -> Result<(), InvariantViolation> {
        if self.lives < 0 {
            return Err(InvariantViolation::NegativeLives { lives: self.lives });
        }

        let (w, h) = (self.tuning.width, self.tuning.height);
        let mut bodies: Vec<(EntityKind, usize, Vec2, f32)> =
            vec![(EntityKind::Ship, 0, self.ship.pos, self.ship.radius)];
        bodies.extend(
            self.bullets
                .iter()
                .enumerate()
                .map(|(i, b)| (EntityKind::PlayerBullet, i, b.pos, b.radius)),
        );
        bodies.extend(
            self.enemy_bullets
                .iter()
                .enumerate()
                .map(|(i, b)| (EntityKind::EnemyBullet, i, b.pos, b.radius)),
        );
        bodies.extend(
            self.asteroids
                .iter()
                .enumerate()
                .map(|(i, a)| (EntityKind::Asteroid, i, a.pos, a.radius)),
        );
        bodies.extend(
            self.ufos
                .iter()
                .enumerate()
                .map(|(i, u)| (EntityKind::Ufo, i, u.pos, u.radius)),
        );

        for (kind, index, pos, radius) in bodies {
            if !(pos.x >= 0.0 && pos.x < w && pos.y >= 0.0 && pos.y < h) {
                return Err(InvariantViolation::EntityOutOfBounds {
                    kind,
                    index,
                    x: pos.x,
                    y: pos.y,
                });
            }
            if radius <= 0.0 {
                return Err(InvariantViolation::NonPositiveRadius {
                    kind,
                    index,
                    radius,
                });
            }
        }

        let max = self.tuning.bullet_ttl;
        for (kind, list) in [
            (EntityKind::PlayerBullet, &self.bullets),
            (EntityKind::EnemyBullet, &self.enemy_bullets),
        ] {
            if let Some((index, b)) = list
                .iter()
                .enumerate()
                .find(|(_, b)| !(b.ttl > 0.0 && b.ttl <= max))
            {
                return Err(InvariantViolation::BulletTtlOutOfRange {
                    kind,
                    index,
                    ttl: b.ttl,
                    max,
                });
            }
        }

        if let Some(active) = self.audio.active_loop_count() {
            let owned = self.ufos.iter().filter(|u| u.engine().is_some()).count();
            if active != owned {
                return Err(InvariantViolation::LeakedEngineLoops { active, owned });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCommand;

    #[test]
    fn test_new_world_starts_wave_one() {
        let world = World::with_seed(1);
        assert_eq!(world.wave(), 1);
        assert_eq!(world.score(), 0);
        assert_eq!(world.lives(), world.tuning().start_lives);
        assert_eq!(world.asteroids().len(), 4);
        assert!(world.asteroids().iter().all(|a| a.size == AsteroidSize::Large));
        assert_eq!(world.phase(), WavePhase::Playing);
        assert!(world.validate_invariants().is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let mut tuning = Tuning::default();
        tuning.ufo_drift = -0.5;
        assert!(matches!(
            World::new(tuning, 1, AudioQueue::new()),
            Err(TuningError::Invalid {
                field: "ufo_drift",
                ..
            })
        ));
    }

    #[test]
    fn test_new_with_valid_tuning_runs_ufos() {
        let tuning = Tuning {
            ufo_drift: 0.0,
            ufo_shot_jitter: 0.0,
            ..Tuning::default()
        };
        let mut world = World::new(tuning, 2, AudioQueue::new()).expect("valid tuning");
        for _ in 0..20 {
            world.spawn_ufo();
        }
        for _ in 0..120 {
            world.update(1.0 / 60.0, &crate::sim::TickInput::default());
        }
        assert_eq!(world.validate_invariants(), Ok(()));
    }

    #[test]
    fn test_wave_spawns_keep_safe_distance() {
        for seed in 0..20 {
            let world = World::with_seed(seed);
            let ship = world.ship().pos;
            for a in world.asteroids() {
                assert!((a.pos - ship).length() >= world.tuning().wave_safe_distance);
            }
        }
    }

    #[test]
    fn test_split_large_yields_two_medium() {
        let mut world = World::with_seed(2);
        world.asteroids.clear();
        let pos = Vec2::new(100.0, 100.0);
        world.spawn_asteroid(pos, Vec2::ZERO, AsteroidSize::Large);

        world.split_asteroid(0);

        assert_eq!(world.asteroids().len(), 2);
        assert!(world.asteroids().iter().all(|a| a.size == AsteroidSize::Medium));
        assert!(world.asteroids().iter().all(|a| (a.pos - pos).length() < 1e-3));
        assert_eq!(world.score(), world.tuning().asteroid_large.score);

        let t = world.tuning().clone();
        for a in world.asteroids() {
            let speed = a.vel.length();
            assert!(speed >= t.asteroid_speed_min * t.split_speed_boost - 1e-2);
            assert!(speed <= t.asteroid_speed_max * t.split_speed_boost + 1e-2);
        }
    }

    #[test]
    fn test_split_small_yields_nothing() {
        let mut world = World::with_seed(3);
        world.asteroids.clear();
        world.spawn_asteroid(Vec2::new(50.0, 50.0), Vec2::ZERO, AsteroidSize::Small);
        world.audio_mut().drain();

        world.split_asteroid(0);

        assert!(world.asteroids().is_empty());
        assert_eq!(world.score(), world.tuning().asteroid_small.score);
        assert_eq!(
            world.audio_mut().drain(),
            vec![AudioCommand::Play {
                effect: SoundEffect::MediumBreak,
                volume: 0.8 * 0.8,
            }]
        );
    }

    #[test]
    fn test_ship_die_respawns_with_safety_window() {
        let mut world = World::with_seed(4);
        world.ship.pos = Vec2::new(10.0, 10.0);
        world.ship.vel = Vec2::new(30.0, 0.0);
        world.ship.angle = 12.0;
        world.safe = 0.0;

        world.ship_die();

        assert_eq!(world.lives(), world.tuning().start_lives - 1);
        assert!(world.ship().alive);
        assert_eq!(world.ship().pos, world.tuning().center());
        assert_eq!(world.ship().vel, Vec2::ZERO);
        assert_eq!(world.ship().angle, crate::consts::SHIP_START_ANGLE);
        assert_eq!(world.ship().invuln, world.tuning().safe_spawn_time);
        assert_eq!(world.safe, world.tuning().safe_spawn_time);
    }

    #[test]
    fn test_ship_die_is_noop_when_dead() {
        let mut world = World::with_seed(5);
        world.ship.alive = false;
        world.ship_die();
        assert_eq!(world.lives(), world.tuning().start_lives);
    }

    #[test]
    fn test_lives_exhaustion_resets_world() {
        let mut world = World::with_seed(6);
        world.score = 4_560;
        world.wave = 7;
        world.lives = 0;
        world.spawn_ufo();
        assert_eq!(world.audio().active_loop_count(), Some(1));

        world.ship_die();

        assert_eq!(world.score(), 0);
        assert_eq!(world.lives(), world.tuning().start_lives);
        assert_eq!(world.wave(), 1);
        assert!(world.ufos().is_empty());
        assert_eq!(world.audio().active_loop_count(), Some(0));
        assert!(world.validate_invariants().is_ok());
    }

    #[test]
    fn test_try_fire_respects_bullet_cap() {
        let mut world = World::with_seed(7);
        let cap = world.tuning().max_bullets;
        for _ in 0..cap {
            world.ship.cooldown = 0.0;
            assert!(world.try_fire());
        }
        world.ship.cooldown = 0.0;
        assert!(!world.try_fire());
        assert_eq!(world.bullets().len(), cap);
    }

    #[test]
    fn test_despawn_stops_engine_loop() {
        let mut world = World::with_seed(8);
        world.spawn_ufo();
        world.spawn_ufo();
        assert_eq!(world.audio().active_loop_count(), Some(2));

        world.despawn_ufo(0);
        assert_eq!(world.audio().active_loop_count(), Some(1));
        assert!(world.validate_invariants().is_ok());
    }

    #[test]
    fn test_detects_out_of_bounds_entity() {
        let mut world = World::with_seed(9);
        world.asteroids[0].pos.x = world.tuning().width;
        assert!(matches!(
            world.validate_invariants(),
            Err(InvariantViolation::EntityOutOfBounds {
                kind: EntityKind::Asteroid,
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_draw_enumerates_every_entity() {
        let mut world = World::with_seed(10);
        world.spawn_ufo();
        world.try_fire();

        let mut shapes = Vec::new();
        world.draw(&mut shapes);

        // 4 asteroids + 2 ufo ellipses + 1 bullet + ship hull (+ shield ring)
        let shield = usize::from(world.ship().shield_visible());
        assert_eq!(shapes.len(), 4 + 2 + 1 + 1 + shield);
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::with_seed(11);
        let json = serde_json::to_string(&world.snapshot()).expect("serialize");
        let back: WorldSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.hud, world.hud());
        assert_eq!(back.asteroids.len(), world.asteroids().len());
    }
}
