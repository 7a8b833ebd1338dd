//! The harvesting sub-machine.
//!
//! At most one harvest session exists at a time. Progress is a pure
//! function of the clock; completion yields a rolled quantity of the
//! resource's item, deactivates the node, and schedules its respawn.
//! Issuing any new move order cancels the session with no loot.

use embervale_common::{EntityId, Position};
use serde::{Deserialize, Serialize};

use crate::area::{Resource, ResourceKind};
use crate::item::Item;

/// How long one harvest takes.
pub const HARVEST_DURATION_MS: u64 = 3000;
/// How long a harvested node stays inactive before respawning.
pub const RESOURCE_RESPAWN_MS: u64 = 10_000;
/// Auto-close delay for the harvest results panel.
pub const RESULT_PANEL_CLOSE_MS: u64 = 2000;
/// Largest quantity a single harvest can yield.
pub const MAX_HARVEST_QUANTITY: u32 = 3;
/// Skill progress granted by a successful harvest, before the random bonus.
pub const BASE_SKILL_GAIN: f32 = 0.1;

/// An in-progress harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestSession {
    /// The node being harvested
    pub resource: EntityId,
    /// Item name the node yields
    pub resource_name: String,
    /// Resource kind, for the skill it trains
    pub kind: ResourceKind,
    /// Node position, snapshotted for the progress overlay
    pub position: Position,
    /// Session start time (ms)
    pub started: u64,
    /// Harvest duration (ms)
    pub duration_ms: u64,
}

impl HarvestSession {
    /// Starts a session over the given resource node.
    #[must_use]
    pub fn start(resource: &Resource, now: u64) -> Self {
        Self {
            resource: resource.id,
            resource_name: resource.name.clone(),
            kind: resource.kind,
            position: resource.position,
            started: now,
            duration_ms: HARVEST_DURATION_MS,
        }
    }

    /// Progress in `[0, 1]`. Monotonically non-decreasing in `now`.
    #[must_use]
    pub fn progress(&self, now: u64) -> f32 {
        let elapsed = now.saturating_sub(self.started) as f32;
        (elapsed / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Milliseconds until completion.
    #[must_use]
    pub fn remaining_ms(&self, now: u64) -> u64 {
        (self.started + self.duration_ms).saturating_sub(now)
    }

    /// Whether the full duration has elapsed.
    #[must_use]
    pub fn is_complete(&self, now: u64) -> bool {
        now.saturating_sub(self.started) >= self.duration_ms
    }

    /// Rolls the yield for this session: a stack of 1-3 of the node's item.
    #[must_use]
    pub fn roll_loot(&self, rng: &mut fastrand::Rng, area_name: &str) -> Item {
        let quantity = rng.u32(1..=MAX_HARVEST_QUANTITY);
        Item::resource(
            self.resource_name.clone(),
            quantity,
            format!("{} gathered in {}", self.resource_name, area_name),
        )
    }

    /// Skill progress granted on completion.
    #[must_use]
    pub fn skill_gain(rng: &mut fastrand::Rng) -> f32 {
        BASE_SKILL_GAIN + rng.f32() * BASE_SKILL_GAIN
    }
}
