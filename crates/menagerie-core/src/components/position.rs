//! Position Component

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// 2-D position in the abstract world plane. Interaction proximity is
/// Euclidean distance over these coordinates.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < f32::EPSILON);
        assert!((b.distance_to(&a) - 5.0).abs() < f32::EPSILON);
    }
}
