//! # Embervale Common
//!
//! Common types, utilities, and shared abstractions for Embervale.
//!
//! This crate provides foundational types used across all Embervale subsystems:
//! - 2D position math for the area map
//! - ID types (EntityId, ItemId, AreaId)
//! - The millisecond game clock driving the simulation
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod ids;
pub mod position;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::ids::*;
    pub use crate::position::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_position_step_toward() {
        let from = Position::new(0.0, 0.0);
        let to = Position::new(10.0, 0.0);

        let stepped = from.step_toward(to, 2.5);
        assert!((stepped.x - 2.5).abs() < f32::EPSILON);
        assert!((stepped.y).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clock_monotonic() {
        let mut clock = GameClock::new();
        clock.advance(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
    }
}
