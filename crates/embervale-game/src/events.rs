//! UI notification bus.
//!
//! The simulation publishes purely observational events; the DOM/side-panel
//! layer drains them after each frame. Nothing here feeds back into game
//! state.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Which combatant a health change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combatant {
    /// The player
    Player,
    /// The battle enemy
    Enemy,
}

/// Notifications consumed by the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UiEvent {
    /// Player vitals, gold, or progression changed.
    PlayerInfoChanged,
    /// A line for the activity log.
    LogMessage {
        /// Log text
        text: String,
    },
    /// Harvest progress update, once per tick while harvesting.
    HarvestProgress {
        /// Progress in whole percent (0-100)
        percent: u32,
        /// Milliseconds until completion
        remaining_ms: u64,
    },
    /// A harvest finished and yielded loot.
    HarvestCompleted {
        /// Items granted
        items: Vec<Item>,
    },
    /// The harvest results panel should close (auto-close timer).
    HarvestPanelClosed,
    /// Player attack cooldown, in whole percent (100 = ready).
    BattleCooldown {
        /// Cooldown progress percent
        percent: u32,
    },
    /// A line for the battle log.
    BattleLog {
        /// Log text
        text: String,
    },
    /// A combatant's health changed.
    BattleHealthChanged {
        /// Whose health
        who: Combatant,
        /// Current health
        current: u32,
        /// Maximum health
        max: u32,
    },
    /// The battle ended, one event per battle.
    BattleEnded {
        /// Whether the player won
        victory: bool,
        /// Experience awarded (zero on defeat)
        exp: u64,
        /// Gold awarded (zero on defeat)
        gold: u32,
        /// Dropped items
        drops: Vec<Item>,
    },
    /// The current area was replaced.
    AreaChanged {
        /// New area's display name
        area_name: String,
    },
    /// Inventory or equipment contents changed.
    InventoryChanged,
    /// A merchant's market opened with this catalog.
    MarketOpened {
        /// Items for sale
        catalog: Vec<Item>,
    },
}

/// Bounded, non-blocking event bus between the simulation and the UI.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<UiEvent>,
    receiver: Receiver<UiEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates an event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event. Non-blocking; if the UI has fallen this far
    /// behind, the event is dropped.
    pub fn publish(&self, event: UiEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Number of events waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
