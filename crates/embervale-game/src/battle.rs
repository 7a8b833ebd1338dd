//! The battle sub-machine.
//!
//! A battle holds a snapshot copy of the enemy; damage during the fight
//! never writes back to the area's NPC entity until resolution. The enemy
//! swings on a deferred-task chain (first swing after a fixed delay, then
//! cooldown plus jitter); each fire re-validates the battle generation so
//! fleeing or victory silently ends the chain.

use embervale_common::{EntityId, Position};
use serde::{Deserialize, Serialize};

use crate::area::Npc;
use crate::item::{Item, ItemKind, Rarity};

/// Player attack cooldown shown in the UI.
pub const BATTLE_COOLDOWN_MS: u64 = 1500;
/// Delay before the enemy's first swing.
pub const FIRST_ENEMY_ATTACK_DELAY_MS: u64 = 1500;
/// Upper bound of the random jitter added between enemy swings.
pub const ENEMY_ATTACK_JITTER_MS: u64 = 500;
/// Fraction of max health restored after a defeat.
pub const DEFEAT_HEALTH_FRACTION: f32 = 0.3;

/// Drop roll threshold for the common drop.
const COMMON_DROP_THRESHOLD: f64 = 0.3;
/// Drop roll threshold for the additional uncommon drop.
const UNCOMMON_DROP_THRESHOLD: f64 = 0.7;

/// A copy of the enemy taken at battle start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// The area NPC this snapshot was taken from
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Combat level
    pub level: u32,
    /// Current health within this battle
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
    /// Position, for the battle overlay
    pub position: Position,
}

impl EnemySnapshot {
    /// Snapshots an NPC, defaulting health from max health (or the other
    /// way around) when only one side is known.
    #[must_use]
    pub fn from_npc(npc: &Npc) -> Self {
        let mut health = npc.health;
        let mut max_health = npc.max_health;
        if health == 0 {
            health = if max_health > 0 { max_health } else { 30 };
        }
        if max_health == 0 {
            max_health = health;
        }
        Self {
            id: npc.id,
            name: npc.name.clone(),
            level: npc.level,
            health,
            max_health,
            position: npc.position,
        }
    }
}

/// An active battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSession {
    /// Enemy snapshot; mutated during the fight
    pub enemy: EnemySnapshot,
    /// Player attack cooldown (ms)
    pub cooldown_ms: u64,
    /// When the player last attacked (ms)
    pub last_attack: u64,
    /// When the enemy was last hit, for the hit-flash overlay (ms)
    pub last_hit: u64,
    /// Generation stamped on this session's deferred tasks
    pub generation: u64,
}

impl BattleSession {
    /// Opens a battle against the given NPC.
    #[must_use]
    pub fn start(npc: &Npc, generation: u64) -> Self {
        Self {
            enemy: EnemySnapshot::from_npc(npc),
            cooldown_ms: BATTLE_COOLDOWN_MS,
            last_attack: 0,
            last_hit: 0,
            generation,
        }
    }

    /// Player attack cooldown progress in whole percent, capped at 100.
    ///
    /// The engine itself does not rate-limit player attacks; the UI
    /// disables the attack control below 100.
    #[must_use]
    pub fn cooldown_percent(&self, now: u64) -> u32 {
        let elapsed = now.saturating_sub(self.last_attack);
        (elapsed * 100 / self.cooldown_ms).min(100) as u32
    }
}

/// Damage of one player attack: `5 + floor(strength / 2)`.
#[must_use]
pub const fn player_attack_damage(strength: u32) -> u32 {
    5 + strength / 2
}

/// Damage of one enemy attack: `3 + level`, with level floored at 1.
#[must_use]
pub const fn enemy_attack_damage(level: u32) -> u32 {
    3 + if level > 0 { level } else { 1 }
}

/// Rewards granted by a victory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRewards {
    /// Experience gained
    pub exp: u64,
    /// Gold gained
    pub gold: u32,
    /// Item drops
    pub drops: Vec<Item>,
}

/// Rolls victory rewards for an enemy of the given level.
#[must_use]
pub fn roll_rewards(level: u32, rng: &mut fastrand::Rng) -> BattleRewards {
    let level = level.max(1);
    let exp = 10 + u64::from(level) * 5;
    let gold = 5 + rng.u32(0..10) * level;
    // One draw decides both drops; the uncommon drop can only appear
    // together with the common one.
    let draw = rng.f64();
    let material_quantity = rng.u32(1..=2);
    let drops = roll_drops(draw, material_quantity);
    BattleRewards { exp, gold, drops }
}

/// Maps a single random draw onto the drop table.
#[must_use]
pub fn roll_drops(draw: f64, material_quantity: u32) -> Vec<Item> {
    let mut drops = Vec::new();
    if draw > COMMON_DROP_THRESHOLD {
        drops.push(Item::drop_loot(
            "Small Potion",
            ItemKind::Consumable,
            Rarity::Common,
            1,
        ));
    }
    if draw > UNCOMMON_DROP_THRESHOLD {
        drops.push(Item::drop_loot(
            "Monster Material",
            ItemKind::General,
            Rarity::Uncommon,
            material_quantity,
        ));
    }
    drops
}
