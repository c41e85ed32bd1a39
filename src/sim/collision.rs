//! Collision detection and response
//!
//! Everything is a circle, tested pairwise. Resolution runs in a fixed
//! order each frame: player bullets against asteroids, hazards against the
//! ship, player bullets against UFOs, then UFOs against asteroids.

use glam::Vec2;

use super::world::World;
use crate::audio::AudioSink;

/// Two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    (a - b).length() < a_radius + b_radius
}

/// Point strictly inside a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).length() < radius
}

impl<A: AudioSink> World<A> {
    pub(crate) fn resolve_collisions(&mut self) {
        self.bullets_vs_asteroids();
        self.ship_hazards();
        self.bullets_vs_ufos();
        self.ufos_vs_asteroids();
    }

    /// Every bullet inside an asteroid is consumed; the asteroid splits once
    fn bullets_vs_asteroids(&mut self) {
        let mut hits = Vec::new();
        for (i, asteroid) in self.asteroids.iter().enumerate() {
            let before = self.bullets.len();
            self.bullets
                .retain(|b| !point_in_circle(b.pos, asteroid.pos, asteroid.radius));
            if self.bullets.len() < before {
                hits.push(i);
            }
        }
        // Descending so earlier indices stay valid
        for &i in hits.iter().rev() {
            self.split_asteroid(i);
        }
    }

    /// Asteroid, then UFO, then enemy bullet; the first hit kills
    fn ship_hazards(&mut self) {
        let ship = &self.ship;
        if !ship.alive || ship.invuln > 0.0 || self.safe > 0.0 {
            return;
        }

        if self
            .asteroids
            .iter()
            .any(|a| circles_overlap(ship.pos, ship.radius, a.pos, a.radius))
        {
            log::debug!("Ship hit by asteroid");
            self.ship_die();
            return;
        }

        if self
            .ufos
            .iter()
            .any(|u| circles_overlap(ship.pos, ship.radius, u.pos, u.radius))
        {
            log::debug!("Ship rammed by UFO");
            self.ship_die();
            return;
        }

        let (pos, radius) = (ship.pos, ship.radius);
        let before = self.enemy_bullets.len();
        self.enemy_bullets
            .retain(|b| !circles_overlap(pos, radius, b.pos, b.radius));
        if self.enemy_bullets.len() < before {
            log::debug!("Ship shot by UFO");
            self.ship_die();
        }
    }

    /// Each UFO takes at most one bullet and is destroyed by it
    fn bullets_vs_ufos(&mut self) {
        let mut i = 0;
        while i < self.ufos.len() {
            let ufo = &self.ufos[i];
            let hit = self
                .bullets
                .iter()
                .position(|b| circles_overlap(b.pos, b.radius, ufo.pos, ufo.radius));
            match hit {
                Some(b) => {
                    self.bullets.remove(b);
                    let ufo = self.despawn_ufo(i);
                    self.score += ufo.score(&self.tuning);
                    log::info!("{:?} UFO destroyed (score {})", ufo.size, self.score);
                }
                None => i += 1,
            }
        }
    }

    /// A UFO touching any asteroid is destroyed; every touched asteroid splits
    fn ufos_vs_asteroids(&mut self) {
        let mut doomed = Vec::new();
        let mut hit = vec![false; self.asteroids.len()];
        for (u, ufo) in self.ufos.iter().enumerate() {
            let mut crashed = false;
            for (a, asteroid) in self.asteroids.iter().enumerate() {
                if circles_overlap(ufo.pos, ufo.radius, asteroid.pos, asteroid.radius) {
                    hit[a] = true;
                    crashed = true;
                }
            }
            if crashed {
                doomed.push(u);
            }
        }

        for &u in doomed.iter().rev() {
            let ufo = self.despawn_ufo(u);
            log::debug!("{:?} UFO crashed into an asteroid", ufo.size);
        }
        for a in (0..hit.len()).rev() {
            if hit[a] {
                self.split_asteroid(a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AsteroidSize, Bullet, Ufo, UfoSize};

    fn open_field(seed: u64) -> World {
        let mut world = World::with_seed(seed);
        world.asteroids.clear();
        world.safe = 0.0;
        world.ship.invuln = 0.0;
        world
    }

    fn place_ufo(world: &mut World, pos: Vec2, size: UfoSize) {
        let tuning = world.tuning().clone();
        let mut ufo = Ufo::new(pos, size, None, &tuning, &mut world.rng);
        ufo.shot_timer = 10.0;
        world.insert_ufo(ufo);
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.9, 0.0), 5.0));
        assert!(!point_in_circle(Vec2::new(3.0, 4.0), Vec2::ZERO, 5.0));
        assert!(point_in_circle(Vec2::new(3.0, 3.9), Vec2::ZERO, 5.0));
    }

    #[test]
    fn test_two_bullets_split_once() {
        let mut world = open_field(1);
        let tuning = world.tuning().clone();
        let pos = Vec2::new(200.0, 200.0);
        world.spawn_asteroid(pos, Vec2::ZERO, AsteroidSize::Large);
        world.bullets.push(Bullet::new(pos, Vec2::ZERO, &tuning));
        world
            .bullets
            .push(Bullet::new(pos + Vec2::new(5.0, 0.0), Vec2::ZERO, &tuning));

        world.resolve_collisions();

        assert!(world.bullets().is_empty());
        assert_eq!(world.asteroids().len(), 2);
        assert_eq!(world.score(), tuning.asteroid_large.score);
    }

    #[test]
    fn test_bullet_outside_radius_misses() {
        let mut world = open_field(2);
        let tuning = world.tuning().clone();
        let pos = Vec2::new(200.0, 200.0);
        world.spawn_asteroid(pos, Vec2::ZERO, AsteroidSize::Small);
        let r = world.asteroids()[0].radius;
        world
            .bullets
            .push(Bullet::new(pos + Vec2::new(r, 0.0), Vec2::ZERO, &tuning));

        world.resolve_collisions();

        assert_eq!(world.bullets().len(), 1);
        assert_eq!(world.asteroids().len(), 1);
    }

    #[test]
    fn test_invulnerable_ship_ignores_asteroid() {
        let mut world = open_field(3);
        let ship = world.ship().pos;
        world.spawn_asteroid(ship, Vec2::ZERO, AsteroidSize::Large);

        world.ship.invuln = 0.3;
        world.resolve_collisions();
        assert_eq!(world.lives(), world.tuning().start_lives);

        world.ship.invuln = 0.0;
        world.safe = 0.1;
        world.resolve_collisions();
        assert_eq!(world.lives(), world.tuning().start_lives);

        world.safe = 0.0;
        world.resolve_collisions();
        assert_eq!(world.lives(), world.tuning().start_lives - 1);
        assert_eq!(world.ship().pos, world.tuning().center());
    }

    #[test]
    fn test_enemy_bullet_kills_and_is_consumed() {
        let mut world = open_field(4);
        let tuning = world.tuning().clone();
        let ship = world.ship().pos;
        world
            .enemy_bullets
            .push(Bullet::new(ship + Vec2::new(3.0, 0.0), Vec2::ZERO, &tuning));
        world
            .enemy_bullets
            .push(Bullet::new(Vec2::new(10.0, 10.0), Vec2::ZERO, &tuning));

        world.resolve_collisions();

        assert_eq!(world.lives(), tuning.start_lives - 1);
        assert_eq!(world.enemy_bullets().len(), 1);
    }

    #[test]
    fn test_one_death_per_frame() {
        let mut world = open_field(5);
        let tuning = world.tuning().clone();
        // Ship sits away from centre so the respawn point is clear
        world.ship.pos = Vec2::new(100.0, 100.0);
        let ship = world.ship().pos;
        world.spawn_asteroid(ship, Vec2::ZERO, AsteroidSize::Small);
        world
            .enemy_bullets
            .push(Bullet::new(ship, Vec2::ZERO, &tuning));

        world.resolve_collisions();

        assert_eq!(world.lives(), tuning.start_lives - 1);
        assert_eq!(world.enemy_bullets().len(), 1);
    }

    #[test]
    fn test_bullet_destroys_ufo_and_scores() {
        let mut world = open_field(6);
        let tuning = world.tuning().clone();
        let pos = Vec2::new(300.0, 500.0);
        place_ufo(&mut world, pos, UfoSize::Small);
        world.bullets.push(Bullet::new(pos, Vec2::ZERO, &tuning));
        world.bullets.push(Bullet::new(pos, Vec2::ZERO, &tuning));

        world.resolve_collisions();

        assert!(world.ufos().is_empty());
        assert_eq!(world.bullets().len(), 1);
        assert_eq!(world.score(), tuning.ufo_small.score);
        assert_eq!(world.audio().active_loop_count(), Some(0));
    }

    #[test]
    fn test_ufo_crash_splits_asteroid_and_stops_loop() {
        let mut world = open_field(7);
        let tuning = world.tuning().clone();
        let pos = Vec2::new(700.0, 150.0);
        world.spawn_asteroid(pos, Vec2::ZERO, AsteroidSize::Medium);
        place_ufo(&mut world, pos + Vec2::new(10.0, 0.0), UfoSize::Big);
        assert_eq!(world.audio().active_loop_count(), Some(1));

        world.resolve_collisions();

        assert!(world.ufos().is_empty());
        assert_eq!(world.audio().active_loop_count(), Some(0));
        assert_eq!(world.asteroids().len(), 2);
        assert!(world.asteroids().iter().all(|a| a.size == AsteroidSize::Small));
        assert_eq!(world.score(), tuning.asteroid_medium.score);
    }

    #[test]
    fn test_two_ufos_one_asteroid_splits_once() {
        let mut world = open_field(8);
        let pos = Vec2::new(500.0, 150.0);
        world.spawn_asteroid(pos, Vec2::ZERO, AsteroidSize::Small);
        place_ufo(&mut world, pos + Vec2::new(8.0, 0.0), UfoSize::Small);
        place_ufo(&mut world, pos - Vec2::new(8.0, 0.0), UfoSize::Small);

        world.resolve_collisions();

        assert!(world.ufos().is_empty());
        assert!(world.asteroids().is_empty());
        assert_eq!(world.score(), world.tuning().asteroid_small.score);
        assert_eq!(world.validate_invariants(), Ok(()));
    }
}
