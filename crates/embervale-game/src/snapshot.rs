//! Read-only render snapshots.
//!
//! The canvas renderer consumes a snapshot of the current state once per
//! frame. Building a snapshot never mutates anything; presentation cannot
//! feed back into the simulation.

use embervale_common::Position;
use serde::{Deserialize, Serialize};

use crate::area::{Area, NpcKind, ResourceKind};
use crate::battle::BattleSession;
use crate::harvest::HarvestSession;
use crate::player::Player;

/// The player as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Display name
    pub name: String,
    /// Current position
    pub position: Position,
    /// Current health
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
}

/// A resource node as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    /// Display name
    pub name: String,
    /// Node kind, for icon selection
    pub kind: ResourceKind,
    /// Position
    pub position: Position,
    /// Inactive nodes are not drawn
    pub active: bool,
}

/// An NPC as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcView {
    /// Display name
    pub name: String,
    /// NPC kind, for icon selection
    pub kind: NpcKind,
    /// Position
    pub position: Position,
    /// Inactive NPCs are not drawn
    pub active: bool,
}

/// An exit as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitView {
    /// Display name
    pub name: String,
    /// Position
    pub position: Position,
}

/// The harvest-in-progress overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestOverlay {
    /// Where to draw the progress bar
    pub position: Position,
    /// Progress in `[0, 1]`
    pub progress: f32,
}

/// The battle overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOverlay {
    /// Enemy name
    pub enemy_name: String,
    /// Enemy position
    pub position: Position,
    /// Enemy health within the battle
    pub health: u32,
    /// Enemy maximum health
    pub max_health: u32,
    /// When the enemy was last hit (ms), for the hit flash
    pub last_hit: u64,
}

/// A complete frame snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Area display name
    pub area_name: String,
    /// The player
    pub player: PlayerView,
    /// Resource nodes
    pub resources: Vec<ResourceView>,
    /// NPCs
    pub npcs: Vec<NpcView>,
    /// Exits
    pub exits: Vec<ExitView>,
    /// Active harvest, if any
    pub harvest: Option<HarvestOverlay>,
    /// Active battle, if any
    pub battle: Option<BattleOverlay>,
}

impl RenderSnapshot {
    /// Captures the current frame.
    #[must_use]
    pub fn capture(
        player: &Player,
        area: &Area,
        harvest: Option<&HarvestSession>,
        battle: Option<&BattleSession>,
        now: u64,
    ) -> Self {
        Self {
            area_name: area.name.clone(),
            player: PlayerView {
                name: player.username.clone(),
                position: player.position,
                health: player.health,
                max_health: player.max_health,
            },
            resources: area
                .resources
                .iter()
                .map(|resource| ResourceView {
                    name: resource.name.clone(),
                    kind: resource.kind,
                    position: resource.position,
                    active: resource.active,
                })
                .collect(),
            npcs: area
                .npcs
                .iter()
                .map(|npc| NpcView {
                    name: npc.name.clone(),
                    kind: npc.kind,
                    position: npc.position,
                    active: npc.active,
                })
                .collect(),
            exits: area
                .exits
                .iter()
                .map(|exit| ExitView {
                    name: exit.name.clone(),
                    position: exit.position,
                })
                .collect(),
            harvest: harvest.map(|session| HarvestOverlay {
                position: session.position,
                progress: session.progress(now),
            }),
            battle: battle.map(|session| BattleOverlay {
                enemy_name: session.enemy.name.clone(),
                position: session.enemy.position,
                health: session.enemy.health,
                max_health: session.enemy.max_health,
                last_hit: session.last_hit,
            }),
        }
    }
}
