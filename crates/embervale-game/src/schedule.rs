//! Deferred one-shot tasks.
//!
//! The original client leaned on `setTimeout` closures capturing mutable
//! state. Here every deferred task carries the generation of the session or
//! area that scheduled it; when a task fires, the game state re-validates
//! that generation and silently drops stale tasks. Fleeing a battle or
//! leaving an area therefore cancels its timers without any explicit
//! cancellation plumbing.

use embervale_common::EntityId;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A deferred mutation, validated against its generation on fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Reactivate a harvested resource.
    ResourceRespawn {
        /// The resource to reactivate
        resource: EntityId,
        /// Area generation at schedule time; stale after an area change
        area_generation: u64,
    },
    /// The enemy swings at the player.
    EnemyAttack {
        /// Battle generation at schedule time; stale after flee/vanquish
        generation: u64,
    },
    /// Auto-close the harvest results panel.
    CloseHarvestPanel {
        /// Harvest generation at schedule time
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Scheduled {
    fire_at: u64,
    seq: u64,
    task: Task,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Earliest fire time first; sequence number keeps equal-time tasks
        // in schedule order.
        (self.fire_at, self.seq).cmp(&(other.fire_at, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-ordered queue of deferred tasks.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to fire at the absolute time `fire_at` (ms).
    pub fn schedule(&mut self, fire_at: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled { fire_at, seq, task }));
    }

    /// Pops the next task due at or before `now`, if any.
    pub fn pop_due(&mut self, now: u64) -> Option<Task> {
        if self.queue.peek().is_some_and(|Reverse(s)| s.fire_at <= now) {
            self.queue.pop().map(|Reverse(s)| s.task)
        } else {
            None
        }
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no tasks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_fire_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1000, Task::EnemyAttack { generation: 1 });

        assert!(scheduler.pop_due(999).is_none());
        assert_eq!(scheduler.pop_due(1000), Some(Task::EnemyAttack { generation: 1 }));
    }

    #[test]
    fn test_fires_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2000, Task::CloseHarvestPanel { generation: 1 });
        scheduler.schedule(500, Task::EnemyAttack { generation: 1 });

        assert_eq!(scheduler.pop_due(5000), Some(Task::EnemyAttack { generation: 1 }));
        assert_eq!(scheduler.pop_due(5000), Some(Task::CloseHarvestPanel { generation: 1 }));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_equal_times_fire_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, Task::EnemyAttack { generation: 1 });
        scheduler.schedule(100, Task::EnemyAttack { generation: 2 });

        assert_eq!(scheduler.pop_due(100), Some(Task::EnemyAttack { generation: 1 }));
        assert_eq!(scheduler.pop_due(100), Some(Task::EnemyAttack { generation: 2 }));
    }
}
