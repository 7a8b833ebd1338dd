//! 2D position math for the area map.
//!
//! Positions are in area-local units (canvas pixels in the original client).
//! Movement is straight-line Euclidean only; there is no pathfinding or
//! obstacle avoidance in this game.

use serde::{Deserialize, Serialize};

/// A point in area-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in area units
    pub x: f32,
    /// Y coordinate in area units
    pub y: f32,
}

impl Position {
    /// Origin position.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves `step` units along the straight line toward `target`.
    ///
    /// If `target` is within `step` units, returns `target` exactly (snap,
    /// never overshoot). A zero-distance target is returned unchanged.
    #[must_use]
    pub fn step_toward(self, target: Self, step: f32) -> Self {
        let distance = self.distance_to(target);
        if distance <= step {
            return target;
        }
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        Self {
            x: self.x + dx / distance * step,
            y: self.y + dy / distance * step,
        }
    }

    /// Checks whether `other` lies within `radius` units of this position.
    #[must_use]
    pub fn within(self, other: Self, radius: f32) -> bool {
        self.distance_to(other) < radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_step_toward_snaps() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 1.0);
        // Target closer than the step: snap exactly onto it.
        assert_eq!(a.step_toward(b, 5.0), b);
    }

    #[test]
    fn test_step_toward_partial() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 0.0);
        let stepped = a.step_toward(b, 4.0);
        assert!((stepped.x - 4.0).abs() < 1e-6);
        assert_eq!(stepped.y, 0.0);
    }

    #[test]
    fn test_step_toward_zero_distance() {
        let a = Position::new(7.0, 7.0);
        assert_eq!(a.step_toward(a, 2.5), a);
    }

    #[test]
    fn test_within() {
        let a = Position::new(0.0, 0.0);
        assert!(a.within(Position::new(10.0, 0.0), 25.0));
        assert!(!a.within(Position::new(30.0, 0.0), 25.0));
    }
}
