//! Jittered polygon outlines for asteroids
//!
//! An outline is a closed polygon of vertices relative to the asteroid's
//! centre. It is generated once when the asteroid is created; only the
//! centre moves afterwards.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::angle_to_vec;

/// Closed polygon, vertices relative to the owner's centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    points: Vec<Vec2>,
}

impl Outline {
    /// Generate `steps` vertices at evenly spaced angles, each at
    /// `radius * jitter` with jitter uniform in `[jitter_min, jitter_max]`
    pub fn jittered<R: Rng + ?Sized>(
        rng: &mut R,
        radius: f32,
        steps: usize,
        jitter_min: f32,
        jitter_max: f32,
    ) -> Self {
        let step = 360.0 / steps as f32;
        let points = (0..steps)
            .map(|i| {
                let jitter = rng.random_range(jitter_min..=jitter_max);
                angle_to_vec(i as f32 * step) * (radius * jitter)
            })
            .collect();
        Self { points }
    }

    /// Vertices relative to the centre
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertices placed around `center` (for drawing)
    pub fn translated(&self, center: Vec2) -> Vec<Vec2> {
        self.points.iter().map(|p| center + *p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_vertex_count_and_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        let outline = Outline::jittered(&mut rng, 46.0, 12, 0.75, 1.2);
        assert_eq!(outline.len(), 12);
        for p in outline.points() {
            let r = p.length();
            assert!(r >= 46.0 * 0.75 - 1e-3 && r <= 46.0 * 1.2 + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn test_vertices_evenly_spaced_in_angle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let outline = Outline::jittered(&mut rng, 10.0, 8, 1.0, 1.0);
        for (i, p) in outline.points().iter().enumerate() {
            let expected = angle_to_vec(i as f32 * 45.0) * 10.0;
            assert!((*p - expected).length() < 1e-4);
        }
    }

    #[test]
    fn test_translated_follows_center() {
        let mut rng = Pcg32::seed_from_u64(1);
        let outline = Outline::jittered(&mut rng, 12.0, 8, 0.75, 1.2);
        let center = Vec2::new(100.0, 50.0);
        let placed = outline.translated(center);
        assert_eq!(placed.len(), outline.len());
        assert!((placed[0] - center - outline.points()[0]).length() < 1e-5);
    }
}
