//! # Embervale Game
//!
//! The game-state core of Embervale, a click-to-move incremental RPG.
//!
//! This crate provides the full client-side simulation:
//! - Player character with progression, attributes, and life skills
//! - Areas with resources, NPCs, exits, and click hit-testing
//! - Click-to-move movement with arrival interaction dispatch
//! - Timed harvesting with loot, skill gains, and node respawns
//! - Turn-free battles with cooldowns, rewards, and drops
//! - Inventory, equipment, and market economy rules
//! - Deferred-task scheduler driving all timers off the game clock
//! - Event bus for UI notifications
//! - Channel-based API boundary with an in-process mock backend
//! - Unified error type over the module error enums
//!
//! Everything runs on a fixed 60Hz tick; see [`state::GameState`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod api;
pub mod area;
pub mod battle;
pub mod error;
pub mod events;
pub mod harvest;
pub mod inventory;
pub mod item;
pub mod movement;
pub mod player;
pub mod schedule;
pub mod snapshot;
pub mod state;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::api::*;
    pub use crate::area::*;
    pub use crate::battle::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::harvest::*;
    pub use crate::inventory::*;
    pub use crate::item::*;
    pub use crate::movement::*;
    pub use crate::player::*;
    pub use crate::schedule::*;
    pub use crate::snapshot::*;
    pub use crate::state::*;
}

pub use prelude::*;
