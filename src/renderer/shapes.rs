//! Shape generation for entity outlines

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::state::{Asteroid, Bullet, Ship, Ufo};

/// Distance from the hull to the invulnerability ring
const SHIELD_GAP: f32 = 6.0;

/// Outline primitive, in arena coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Closed polygon
    Polygon { points: Vec<Vec2> },
    /// Axis-aligned; `width` and `height` are full extents
    Ellipse { center: Vec2, width: f32, height: f32 },
}

/// Anything that accepts shapes for drawing
pub trait Surface {
    fn draw(&mut self, shape: Shape);
}

impl Surface for Vec<Shape> {
    fn draw(&mut self, shape: Shape) {
        self.push(shape);
    }
}

/// Hull triangle, plus the shield ring on visible blink phases
pub fn ship(ship: &Ship) -> Vec<Shape> {
    let mut shapes = vec![Shape::Polygon {
        points: ship.hull().to_vec(),
    }];
    if ship.shield_visible() {
        shapes.push(Shape::Circle {
            center: ship.pos,
            radius: ship.radius + SHIELD_GAP,
        });
    }
    shapes
}

pub fn bullet(bullet: &Bullet) -> Shape {
    Shape::Circle {
        center: bullet.pos,
        radius: bullet.radius,
    }
}

pub fn asteroid(asteroid: &Asteroid) -> Shape {
    Shape::Polygon {
        points: asteroid.outline.translated(asteroid.pos),
    }
}

/// Saucer body and cupola
pub fn ufo(ufo: &Ufo) -> [Shape; 2] {
    let r = ufo.radius;
    [
        Shape::Ellipse {
            center: ufo.pos,
            width: r * 2.0,
            height: r,
        },
        Shape::Ellipse {
            center: ufo.pos - Vec2::new(0.0, r * 0.3),
            width: r,
            height: r * 0.7,
        },
    ]
}
