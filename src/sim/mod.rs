//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied `dt` only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each collection)
//! - No rendering or platform dependencies beyond the shape/audio seams

pub mod collision;
pub mod outline;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{circles_overlap, point_in_circle};
pub use outline::Outline;
pub use state::{Asteroid, AsteroidSize, Bullet, Ship, Ufo, UfoSize};
pub use tick::TickInput;
pub use world::{Hud, WavePhase, World, WorldSnapshot};
