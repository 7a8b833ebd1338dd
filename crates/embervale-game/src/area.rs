//! Areas: the currently loaded map and its entities, plus click hit-testing.
//!
//! An area is replaced wholesale on every transition; nothing is merged.
//! Defeated enemies stay inactive for the life of an area, while harvested
//! resources come back on a respawn timer.

use embervale_common::{AreaId, EntityId, Position};
use serde::{Deserialize, Serialize};

use crate::player::Skill;

/// Click radius for hit-testing, in area units.
pub const CLICK_RADIUS: f32 = 25.0;

/// What a resource node yields, and which skill gathering it trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Mineable ore deposits
    Ore,
    /// Fellable trees
    Wood,
    /// Gatherable herbs
    Herb,
    /// Fishing spots
    Fish,
}

impl ResourceKind {
    /// The life skill this resource kind trains.
    #[must_use]
    pub const fn skill(self) -> Skill {
        match self {
            Self::Ore => Skill::Mining,
            Self::Wood => Skill::Woodcutting,
            Self::Fish => Skill::Fishing,
            Self::Herb => Skill::Herbalism,
        }
    }
}

/// A harvestable resource node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Entity ID
    pub id: EntityId,
    /// Display name; also the name of the item it yields
    pub name: String,
    /// What the node yields
    pub kind: ResourceKind,
    /// Position in the area
    pub position: Position,
    /// Inactive nodes are invisible and untargetable until they respawn
    pub active: bool,
    /// Flavor text
    pub description: String,
}

/// Kind of NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKind {
    /// Attackable enemy
    Enemy,
    /// Opens the market
    Merchant,
    /// Idle flavor NPC
    Friendly,
    /// Quest giver
    Quest,
    /// Boss enemy
    Boss,
}

impl NpcKind {
    /// Whether arriving at this NPC starts a battle.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Enemy | Self::Boss)
    }
}

/// A non-player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    /// Entity ID
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Kind of NPC
    pub kind: NpcKind,
    /// Position in the area
    pub position: Position,
    /// Defeated enemies go inactive; they do not respawn within an area
    pub active: bool,
    /// Combat level (meaningful for hostile kinds)
    pub level: u32,
    /// Current health (hostile kinds)
    pub health: u32,
    /// Maximum health (hostile kinds)
    pub max_health: u32,
}

/// A transition point to another area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    /// Entity ID
    pub id: EntityId,
    /// Display name (usually the destination's name)
    pub name: String,
    /// Destination area
    pub target_area: AreaId,
    /// Position in the area
    pub position: Position,
}

/// A decorative object. Clickable but inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    /// Entity ID
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Position in the area
    pub position: Position,
}

/// A resolved click target. The hit-test produces the variant directly;
/// nothing downstream infers entity type from field shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// An NPC (hostile or not)
    Npc {
        /// Entity ID
        id: EntityId,
        /// Kind, so arrival can dispatch without a second lookup
        kind: NpcKind,
    },
    /// A resource node
    Resource {
        /// Entity ID
        id: EntityId,
    },
    /// An exit to another area
    Exit {
        /// Entity ID
        id: EntityId,
        /// Destination
        to: AreaId,
    },
    /// A decorative object
    Prop {
        /// Entity ID
        id: EntityId,
    },
}

/// A hit-test result: the target plus where it sits (the move destination).
#[derive(Debug, Clone, PartialEq)]
pub struct ClickHit {
    /// What was clicked
    pub target: Target,
    /// Where it is
    pub position: Position,
}

/// The currently loaded map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    /// Area ID
    pub id: AreaId,
    /// Display name
    pub name: String,
    /// Terrain flavor tag ("city", "forest", ...)
    pub terrain: String,
    /// Resource nodes
    pub resources: Vec<Resource>,
    /// NPCs
    pub npcs: Vec<Npc>,
    /// Exits
    pub exits: Vec<Exit>,
    /// Decorative objects
    pub props: Vec<Prop>,
}

impl Area {
    /// Finds the entity under a click, if any.
    ///
    /// Priority is fixed: NPCs, then resources, then exits, then props.
    /// Combat and trade targets win over terrain features when click zones
    /// overlap. Inactive entities are skipped. Linear scan; entity counts
    /// per area are tiny.
    #[must_use]
    pub fn hit_test(&self, point: Position) -> Option<ClickHit> {
        for npc in &self.npcs {
            if npc.active && point.within(npc.position, CLICK_RADIUS) {
                return Some(ClickHit {
                    target: Target::Npc {
                        id: npc.id,
                        kind: npc.kind,
                    },
                    position: npc.position,
                });
            }
        }
        for resource in &self.resources {
            if resource.active && point.within(resource.position, CLICK_RADIUS) {
                return Some(ClickHit {
                    target: Target::Resource { id: resource.id },
                    position: resource.position,
                });
            }
        }
        for exit in &self.exits {
            if point.within(exit.position, CLICK_RADIUS) {
                return Some(ClickHit {
                    target: Target::Exit {
                        id: exit.id,
                        to: exit.target_area.clone(),
                    },
                    position: exit.position,
                });
            }
        }
        for prop in &self.props {
            if point.within(prop.position, CLICK_RADIUS) {
                return Some(ClickHit {
                    target: Target::Prop { id: prop.id },
                    position: prop.position,
                });
            }
        }
        None
    }

    /// Looks up a resource by ID.
    #[must_use]
    pub fn resource(&self, id: EntityId) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    /// Looks up a resource mutably by ID.
    pub fn resource_mut(&mut self, id: EntityId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|resource| resource.id == id)
    }

    /// Looks up an NPC by ID.
    #[must_use]
    pub fn npc(&self, id: EntityId) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.id == id)
    }

    /// Looks up an NPC mutably by ID.
    pub fn npc_mut(&mut self, id: EntityId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|npc| npc.id == id)
    }
}

/// Builds the starting town area.
#[must_use]
pub fn town() -> Area {
    Area {
        id: AreaId::new("town"),
        name: "Embervale Town".to_string(),
        terrain: "city".to_string(),
        resources: vec![
            Resource {
                id: EntityId::new(),
                name: "Iron Ore".to_string(),
                kind: ResourceKind::Ore,
                position: Position::new(100.0, 150.0),
                active: true,
                description: "A vein of iron in the rock".to_string(),
            },
            Resource {
                id: EntityId::new(),
                name: "Oak Log".to_string(),
                kind: ResourceKind::Wood,
                position: Position::new(250.0, 200.0),
                active: true,
                description: "A sturdy oak".to_string(),
            },
            Resource {
                id: EntityId::new(),
                name: "Medicinal Herb".to_string(),
                kind: ResourceKind::Herb,
                position: Position::new(400.0, 300.0),
                active: true,
                description: "A patch of healing herbs".to_string(),
            },
        ],
        npcs: vec![
            Npc {
                id: EntityId::new(),
                name: "Merchant".to_string(),
                kind: NpcKind::Merchant,
                position: Position::new(550.0, 150.0),
                active: true,
                level: 1,
                health: 0,
                max_health: 0,
            },
            Npc {
                id: EntityId::new(),
                name: "Slime".to_string(),
                kind: NpcKind::Enemy,
                position: Position::new(150.0, 350.0),
                active: true,
                level: 1,
                health: 30,
                max_health: 30,
            },
        ],
        exits: vec![Exit {
            id: EntityId::new(),
            name: "Forest".to_string(),
            target_area: AreaId::new("forest"),
            position: Position::new(700.0, 400.0),
        }],
        props: Vec::new(),
    }
}

/// Builds the forest area.
#[must_use]
pub fn forest() -> Area {
    Area {
        id: AreaId::new("forest"),
        name: "Dense Forest".to_string(),
        terrain: "forest".to_string(),
        resources: vec![
            Resource {
                id: EntityId::new(),
                name: "Ancient Log".to_string(),
                kind: ResourceKind::Wood,
                position: Position::new(150.0, 200.0),
                active: true,
                description: "Wood from an ancient tree".to_string(),
            },
            Resource {
                id: EntityId::new(),
                name: "Rare Herb".to_string(),
                kind: ResourceKind::Herb,
                position: Position::new(300.0, 250.0),
                active: true,
                description: "A rare flowering herb".to_string(),
            },
        ],
        npcs: vec![Npc {
            id: EntityId::new(),
            name: "Wild Wolf".to_string(),
            kind: NpcKind::Enemy,
            position: Position::new(400.0, 300.0),
            active: true,
            level: 2,
            health: 45,
            max_health: 45,
        }],
        exits: vec![Exit {
            id: EntityId::new(),
            name: "Embervale Town".to_string(),
            target_area: AreaId::new("town"),
            position: Position::new(50.0, 50.0),
        }],
        props: Vec::new(),
    }
}

/// Builds the area with the given ID, if it is known.
#[must_use]
pub fn by_id(id: &AreaId) -> Option<Area> {
    match id.as_str() {
        "town" => Some(town()),
        "forest" => Some(forest()),
        _ => None,
    }
}
