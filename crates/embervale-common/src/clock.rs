//! The millisecond game clock.
//!
//! The simulation never reads the wall clock. The embedding loop advances
//! the clock explicitly each frame, which keeps every timer (harvest
//! progress, battle cooldowns, respawns) deterministic under test.

use serde::{Deserialize, Serialize};

/// Monotonic millisecond clock driven by the embedding loop.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GameClock {
    now: u64,
}

impl GameClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    /// Creates a clock starting at the given millisecond timestamp.
    #[must_use]
    pub const fn at(now: u64) -> Self {
        Self { now }
    }

    /// Current time in milliseconds since clock start.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        assert_eq!(GameClock::new().now(), 0);
    }

    #[test]
    fn test_clock_at() {
        assert_eq!(GameClock::at(5000).now(), 5000);
    }

    #[test]
    fn test_clock_advance_saturates() {
        let mut clock = GameClock::at(u64::MAX - 1);
        clock.advance(100);
        assert_eq!(clock.now(), u64::MAX);
    }
}
