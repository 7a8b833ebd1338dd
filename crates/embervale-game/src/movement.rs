//! Click-to-move controller.
//!
//! Each tick the player advances a fixed number of units straight toward
//! the current target. Arrival within one step snaps exactly onto the
//! target; there is deliberately no overshoot and no pathfinding.

use embervale_common::Position;
use serde::{Deserialize, Serialize};

use crate::area::Target;

/// Units moved per tick.
pub const MOVE_SPEED: f32 = 2.5;

/// What a movement tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum MovementEvent {
    /// Not moving; nothing happened.
    Idle,
    /// Moved one step toward the target.
    Moved,
    /// Reached the target this tick. Carries the entity to interact with,
    /// if the move was toward one.
    Arrived(Option<Target>),
}

/// Advances the player toward a click target each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementController {
    moving: bool,
    target: Option<Position>,
    target_entity: Option<Target>,
    #[serde(default = "default_speed")]
    speed: f32,
}

fn default_speed() -> f32 {
    MOVE_SPEED
}

impl MovementController {
    /// Creates a controller with the standard speed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            moving: false,
            target: None,
            target_entity: None,
            speed: MOVE_SPEED,
        }
    }

    /// Whether the player is currently moving.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// The current move destination.
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        self.target
    }

    /// Movement speed in units per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Starts moving toward `point`, optionally to interact with `entity`
    /// on arrival.
    ///
    /// The caller must cancel any active harvest or battle session when
    /// issuing a new target; interactions never survive a move order.
    pub fn set_target(&mut self, point: Position, entity: Option<Target>) {
        self.target = Some(point);
        self.target_entity = entity;
        self.moving = true;
    }

    /// Stops movement and clears the target.
    pub fn stop(&mut self) {
        self.moving = false;
        self.target = None;
        self.target_entity = None;
    }

    /// Advances `position` one tick toward the target.
    pub fn tick(&mut self, position: &mut Position) -> MovementEvent {
        if !self.moving {
            return MovementEvent::Idle;
        }
        let Some(target) = self.target else {
            self.moving = false;
            return MovementEvent::Idle;
        };

        if position.distance_to(target) < self.speed {
            *position = target;
            self.moving = false;
            self.target = None;
            return MovementEvent::Arrived(self.target_entity.take());
        }

        *position = position.step_toward(target, self.speed);
        MovementEvent::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embervale_common::EntityId;
    use proptest::prelude::*;

    #[test]
    fn test_idle_when_no_target() {
        let mut controller = MovementController::new();
        let mut position = Position::ZERO;
        assert_eq!(controller.tick(&mut position), MovementEvent::Idle);
        assert_eq!(position, Position::ZERO);
    }

    #[test]
    fn test_moves_toward_target() {
        let mut controller = MovementController::new();
        let mut position = Position::ZERO;
        controller.set_target(Position::new(10.0, 0.0), None);

        assert_eq!(controller.tick(&mut position), MovementEvent::Moved);
        assert!((position.x - MOVE_SPEED).abs() < 1e-6);
        assert!(controller.is_moving());
    }

    #[test]
    fn test_snaps_on_arrival() {
        let mut controller = MovementController::new();
        let mut position = Position::new(9.0, 0.0);
        controller.set_target(Position::new(10.0, 0.0), None);

        let event = controller.tick(&mut position);
        assert_eq!(event, MovementEvent::Arrived(None));
        assert_eq!(position, Position::new(10.0, 0.0));
        assert!(!controller.is_moving());
        assert!(controller.target().is_none());
    }

    #[test]
    fn test_arrival_hands_over_target_entity() {
        let mut controller = MovementController::new();
        let mut position = Position::ZERO;
        let entity = Target::Prop { id: EntityId::new() };
        controller.set_target(Position::new(1.0, 1.0), Some(entity.clone()));

        match controller.tick(&mut position) {
            MovementEvent::Arrived(Some(arrived)) => assert_eq!(arrived, entity),
            other => panic!("expected arrival with entity, got {other:?}"),
        }
    }

    #[test]
    fn test_retarget_replaces_entity() {
        let mut controller = MovementController::new();
        controller.set_target(Position::new(50.0, 0.0), Some(Target::Prop { id: EntityId::new() }));
        controller.set_target(Position::new(1.0, 0.0), None);

        let mut position = Position::ZERO;
        assert_eq!(controller.tick(&mut position), MovementEvent::Arrived(None));
    }

    #[test]
    fn test_eventual_arrival() {
        let mut controller = MovementController::new();
        let mut position = Position::ZERO;
        controller.set_target(Position::new(100.0, 75.0), None);

        let mut arrived = false;
        for _ in 0..100 {
            if matches!(controller.tick(&mut position), MovementEvent::Arrived(_)) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(position, Position::new(100.0, 75.0));
    }

    proptest! {
        // Any target within one step of the player snaps in a single tick,
        // with no residual movement state.
        #[test]
        fn prop_targets_within_speed_snap_in_one_tick(
            x in -2.0f32..2.0,
            y in -2.0f32..2.0,
        ) {
            prop_assume!((x * x + y * y).sqrt() < MOVE_SPEED);
            let mut controller = MovementController::new();
            let mut position = Position::ZERO;
            let target = Position::new(x, y);
            controller.set_target(target, None);

            prop_assert_eq!(controller.tick(&mut position), MovementEvent::Arrived(None));
            prop_assert_eq!(position, target);
            prop_assert!(!controller.is_moving());
        }
    }
}
