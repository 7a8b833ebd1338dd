//! Central game state and the fixed-tick update loop.
//!
//! `GameState` is the single source of truth: player, current area,
//! movement, the interaction sub-machines, deferred tasks, and the UI event
//! bus all hang off it. The embedding page drives it by calling
//! [`GameState::tick`] at ~60Hz and draining events/snapshots afterwards.
//!
//! Each tick runs, in order: due deferred tasks, movement (with arrival
//! dispatch), battle cooldown reporting, then harvest progress. Rendering
//! reads a [`RenderSnapshot`] and never mutates state.

use embervale_common::{AreaId, EntityId, GameClock, ItemId, Position};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiRequest};
use crate::area::{self, Area, NpcKind, Target};
use crate::battle::{
    enemy_attack_damage, player_attack_damage, roll_rewards, BattleSession,
    ENEMY_ATTACK_JITTER_MS, FIRST_ENEMY_ATTACK_DELAY_MS,
};
use crate::error::EmbervaleResult;
use crate::events::{Combatant, EventBus, UiEvent};
use crate::harvest::{HarvestSession, RESOURCE_RESPAWN_MS, RESULT_PANEL_CLOSE_MS};
use crate::inventory::UseOutcome;
use crate::item::Item;
use crate::movement::{MovementController, MovementEvent};
use crate::player::{Attribute, Player};
use crate::schedule::{Scheduler, Task};
use crate::snapshot::RenderSnapshot;

/// Simulation rate.
pub const TICKS_PER_SECOND: u64 = 60;
/// Milliseconds per tick.
pub const TICK_MS: u64 = 1000 / TICKS_PER_SECOND;

/// Where a fresh character stands (canvas center minus half a sprite).
const PLAYER_START: Position = Position::new(384.0, 284.0);

/// The whole client-side game state.
#[derive(Debug)]
pub struct GameState {
    player: Player,
    area: Area,
    /// Bumped on every area change; stale respawn tasks check it.
    area_generation: u64,
    movement: MovementController,
    harvest: Option<HarvestSession>,
    /// Bumped when a harvest completes; gates the panel auto-close task.
    harvest_generation: u64,
    battle: Option<BattleSession>,
    /// Bumped on battle start and end; gates the enemy attack chain.
    battle_generation: u64,
    scheduler: Scheduler,
    events: EventBus,
    rng: fastrand::Rng,
    clock: GameClock,
    api: Option<ApiClient>,
}

impl GameState {
    /// Creates a new game in the starting town.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            player: Player::new(username, PLAYER_START),
            area: area::town(),
            area_generation: 0,
            movement: MovementController::new(),
            harvest: None,
            harvest_generation: 0,
            battle: None,
            battle_generation: 0,
            scheduler: Scheduler::new(),
            events: EventBus::default(),
            rng: fastrand::Rng::new(),
            clock: GameClock::new(),
            api: None,
        }
    }

    /// Creates a game with a seeded RNG, for deterministic tests.
    #[must_use]
    pub fn with_seed(username: impl Into<String>, seed: u64) -> Self {
        let mut state = Self::new(username);
        state.rng = fastrand::Rng::with_seed(seed);
        state
    }

    /// Attaches the network client. Without one the game runs fully
    /// client-side, as the original mock did.
    pub fn attach_api(&mut self, api: ApiClient) {
        self.api = Some(api);
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The current area.
    #[must_use]
    pub fn area(&self) -> &Area {
        &self.area
    }

    /// The UI event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Current simulation time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Whether a harvest is in progress.
    #[must_use]
    pub fn is_harvesting(&self) -> bool {
        self.harvest.is_some()
    }

    /// Whether a battle is in progress.
    #[must_use]
    pub fn in_battle(&self) -> bool {
        self.battle.is_some()
    }

    /// Captures a read-only snapshot for the renderer.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(
            &self.player,
            &self.area,
            self.harvest.as_ref(),
            self.battle.as_ref(),
            self.clock.now(),
        )
    }

    /// Handles a click on the game canvas.
    ///
    /// Any in-progress harvest or battle is cancelled immediately; a new
    /// move order never coexists with an interaction session. The click is
    /// hit-tested against the area and the player starts moving toward
    /// either the clicked entity or the bare point.
    pub fn handle_click(&mut self, point: Position) {
        self.cancel_interactions();
        match self.area.hit_test(point) {
            Some(hit) => self.movement.set_target(hit.position, Some(hit.target)),
            None => self.movement.set_target(point, None),
        }
    }

    /// Advances the simulation by one fixed tick.
    pub fn tick(&mut self) {
        self.clock.advance(TICK_MS);
        let now = self.clock.now();

        self.poll_api();

        while let Some(task) = self.scheduler.pop_due(now) {
            self.run_task(task);
        }

        if let MovementEvent::Arrived(entity) = self.movement.tick(&mut self.player.position) {
            self.push_position_update();
            if let Some(target) = entity {
                self.interact(target);
            }
        }

        if let Some(session) = self.battle.as_ref() {
            self.events.publish(UiEvent::BattleCooldown {
                percent: session.cooldown_percent(now),
            });
        }

        if let Some(session) = self.harvest.as_ref() {
            let progress = session.progress(now);
            self.events.publish(UiEvent::HarvestProgress {
                percent: (progress * 100.0) as u32,
                remaining_ms: session.remaining_ms(now),
            });
            if session.is_complete(now) {
                self.complete_harvest();
            }
        }
    }

    /// Runs whole ticks covering `ms` milliseconds of simulation time.
    pub fn advance(&mut self, ms: u64) {
        for _ in 0..ms / TICK_MS {
            self.tick();
        }
    }

    /// Player-initiated attack in the current battle.
    ///
    /// A guarded no-op when no battle is active: the UI's attack control
    /// can race the end of a battle.
    pub fn attack(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.battle.as_mut() else {
            debug!("attack requested with no active battle");
            return;
        };

        let damage = player_attack_damage(self.player.attributes.strength);
        session.last_attack = now;
        session.last_hit = now;
        session.enemy.health = session.enemy.health.saturating_sub(damage);

        let enemy_name = session.enemy.name.clone();
        let (health, max_health) = (session.enemy.health, session.enemy.max_health);
        self.events.publish(UiEvent::BattleLog {
            text: format!("You hit {enemy_name} for {damage} damage!"),
        });
        self.events.publish(UiEvent::BattleHealthChanged {
            who: Combatant::Enemy,
            current: health,
            max: max_health,
        });

        if health == 0 {
            self.resolve_victory();
        }
    }

    /// Abandons the current battle, if any. The enemy keeps its area state;
    /// pending attack timers die on the generation check.
    pub fn flee(&mut self) {
        if self.battle.is_some() {
            self.cancel_battle();
        }
    }

    /// Buys a market catalog item.
    pub fn buy_item(&mut self, catalog_item: &Item) -> EmbervaleResult<Item> {
        match self.player.buy(catalog_item) {
            Ok(bought) => {
                let price = catalog_item.price.unwrap_or(0);
                self.events.publish(UiEvent::LogMessage {
                    text: format!("You bought {} for {price} gold.", bought.name),
                });
                self.events.publish(UiEvent::InventoryChanged);
                self.events.publish(UiEvent::PlayerInfoChanged);
                if let Some(api) = self.api.as_mut() {
                    api.send(ApiRequest::BuyItem {
                        item_id: catalog_item.id,
                    });
                }
                Ok(bought)
            }
            Err(error) => {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Sells one unit of a carried item.
    pub fn sell_item(&mut self, id: ItemId) -> EmbervaleResult<u32> {
        let name = self
            .player
            .backpack
            .find(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        match self.player.sell(id) {
            Ok(gold) => {
                self.events.publish(UiEvent::LogMessage {
                    text: format!("You sold {name} for {gold} gold."),
                });
                self.events.publish(UiEvent::InventoryChanged);
                self.events.publish(UiEvent::PlayerInfoChanged);
                Ok(gold)
            }
            Err(error) => {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Uses a consumable from the backpack.
    pub fn use_inventory_item(&mut self, id: ItemId) -> EmbervaleResult<UseOutcome> {
        let name = self
            .player
            .backpack
            .find(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        match self.player.use_item(id) {
            Ok(outcome) => {
                let text = match outcome {
                    UseOutcome::Healed(amount) => {
                        format!("You used {name} and recovered {amount} health.")
                    }
                    UseOutcome::NoEffect => format!("You used {name}. Nothing happened."),
                };
                self.events.publish(UiEvent::LogMessage { text });
                self.events.publish(UiEvent::InventoryChanged);
                self.events.publish(UiEvent::PlayerInfoChanged);
                Ok(outcome)
            }
            Err(error) => {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Equips a carried item.
    pub fn equip_item(&mut self, id: ItemId) -> EmbervaleResult<()> {
        let name = self
            .player
            .backpack
            .find(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        match self.player.equip(id) {
            Ok(_displaced) => {
                self.events.publish(UiEvent::LogMessage {
                    text: format!("You equipped {name}."),
                });
                self.events.publish(UiEvent::InventoryChanged);
                if let Some(api) = self.api.as_mut() {
                    api.send(ApiRequest::EquipItem { item_id: id });
                }
                Ok(())
            }
            Err(error) => {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Unequips an item back into the backpack.
    pub fn unequip_item(&mut self, id: ItemId) -> EmbervaleResult<()> {
        let name = self
            .player
            .equipment
            .find(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        match self.player.unequip(id) {
            Ok(()) => {
                self.events.publish(UiEvent::LogMessage {
                    text: format!("You unequipped {name}."),
                });
                self.events.publish(UiEvent::InventoryChanged);
                Ok(())
            }
            Err(error) => {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
                Err(error.into())
            }
        }
    }

    /// Spends one attribute point.
    pub fn distribute_attribute(&mut self, attribute: Attribute) -> bool {
        if !self.player.spend_attribute_point(attribute) {
            return false;
        }
        self.events.publish(UiEvent::PlayerInfoChanged);
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::DistributeAttribute {
                attribute,
                points: 1,
            });
        }
        true
    }

    /// Applies one passive regeneration tick. No effect during a battle.
    pub fn request_regen(&mut self) {
        if self.battle.is_some() {
            return;
        }
        if self.player.regen_tick() {
            self.events.publish(UiEvent::PlayerInfoChanged);
        }
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::RegenTick);
        }
    }

    /// Replaces the current area wholesale.
    pub fn change_area(&mut self, to: &AreaId) {
        let Some(next) = area::by_id(to) else {
            warn!(area = %to, "unknown destination area");
            self.events.publish(UiEvent::LogMessage {
                text: format!("The path to {to} is blocked."),
            });
            return;
        };
        self.cancel_interactions();
        self.movement.stop();
        self.area = next;
        self.area_generation += 1;
        info!(area = %self.area.name, "area changed");
        self.events.publish(UiEvent::AreaChanged {
            area_name: self.area.name.clone(),
        });
        self.push_position_update();
    }

    // ------------------------------------------------------------------
    // Internal: dispatch and sub-machine transitions
    // ------------------------------------------------------------------

    fn interact(&mut self, target: Target) {
        match target {
            Target::Npc { id, kind } if kind.is_hostile() => self.start_battle(id),
            Target::Npc {
                id,
                kind: NpcKind::Merchant,
            } => self.open_market(id),
            Target::Npc { id, .. } => {
                if let Some(npc) = self.area.npc(id) {
                    self.events.publish(UiEvent::LogMessage {
                        text: format!("{} has nothing to say.", npc.name),
                    });
                }
            }
            Target::Resource { id } => self.start_harvest(id),
            Target::Exit { to, .. } => self.change_area(&to),
            Target::Prop { .. } => {
                self.events.publish(UiEvent::LogMessage {
                    text: "There is nothing to do here.".to_string(),
                });
            }
        }
    }

    fn start_harvest(&mut self, id: EntityId) {
        if self.harvest.is_some() || self.battle.is_some() {
            debug!("harvest requested while another interaction is active");
            return;
        }
        let now = self.clock.now();
        let Some(resource) = self.area.resource(id) else {
            debug!(resource = id.raw(), "harvest target vanished");
            return;
        };
        if !resource.active {
            return;
        }
        let session = HarvestSession::start(resource, now);
        info!(resource = %session.resource_name, "harvest started");
        self.events.publish(UiEvent::LogMessage {
            text: format!("Harvesting {}...", session.resource_name),
        });
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::Harvest { harvest_id: id });
        }
        self.harvest = Some(session);
    }

    fn complete_harvest(&mut self) {
        let Some(session) = self.harvest.take() else {
            return;
        };
        let now = self.clock.now();
        let loot = session.roll_loot(&mut self.rng, &self.area.name);

        if !self.player.backpack.has_room_for(&loot) {
            // Leave the node intact: loot is granted iff the node is consumed.
            warn!(resource = %session.resource_name, "backpack full, harvest lost");
            self.events.publish(UiEvent::LogMessage {
                text: "Your backpack is full.".to_string(),
            });
            return;
        }

        if let Some(resource) = self.area.resource_mut(session.resource) {
            resource.active = false;
            self.scheduler.schedule(
                now + RESOURCE_RESPAWN_MS,
                Task::ResourceRespawn {
                    resource: session.resource,
                    area_generation: self.area_generation,
                },
            );
        }

        let gain = HarvestSession::skill_gain(&mut self.rng);
        self.player.skills.gain(session.kind.skill(), gain);

        if let Err(error) = self.player.add_item(loot.clone()) {
            // Room was checked above; treat a racing failure as lost loot.
            warn!(%error, "failed to store harvested loot");
            return;
        }

        info!(
            resource = %session.resource_name,
            quantity = loot.quantity,
            "harvest completed"
        );
        self.events.publish(UiEvent::LogMessage {
            text: format!("You gathered {} x {}.", loot.quantity, loot.name),
        });
        self.events.publish(UiEvent::HarvestCompleted { items: vec![loot] });
        self.events.publish(UiEvent::InventoryChanged);
        self.events.publish(UiEvent::PlayerInfoChanged);

        self.harvest_generation += 1;
        self.scheduler.schedule(
            now + RESULT_PANEL_CLOSE_MS,
            Task::CloseHarvestPanel {
                generation: self.harvest_generation,
            },
        );
    }

    fn start_battle(&mut self, id: EntityId) {
        if self.battle.is_some() || self.harvest.is_some() {
            debug!("battle requested while another interaction is active");
            return;
        }
        let now = self.clock.now();
        let Some(npc) = self.area.npc(id) else {
            debug!(npc = id.raw(), "battle target vanished");
            return;
        };
        if !npc.active || !npc.kind.is_hostile() {
            return;
        }

        self.battle_generation += 1;
        let session = BattleSession::start(npc, self.battle_generation);
        info!(enemy = %session.enemy.name, level = session.enemy.level, "battle started");
        self.events.publish(UiEvent::BattleLog {
            text: format!("A battle with {} begins!", session.enemy.name),
        });
        self.events.publish(UiEvent::BattleHealthChanged {
            who: Combatant::Enemy,
            current: session.enemy.health,
            max: session.enemy.max_health,
        });
        self.events.publish(UiEvent::BattleHealthChanged {
            who: Combatant::Player,
            current: self.player.health,
            max: self.player.max_health,
        });
        self.scheduler.schedule(
            now + FIRST_ENEMY_ATTACK_DELAY_MS,
            Task::EnemyAttack {
                generation: self.battle_generation,
            },
        );
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::Battle { npc_id: id });
        }
        self.battle = Some(session);
    }

    fn fire_enemy_attack(&mut self, generation: u64) {
        let now = self.clock.now();
        let Some(session) = self.battle.as_ref() else {
            return;
        };
        // A stale timer from a fled or finished battle. Drop it; do not
        // reschedule.
        if session.generation != generation {
            return;
        }

        let damage = enemy_attack_damage(session.enemy.level);
        let enemy_name = session.enemy.name.clone();
        let cooldown = session.cooldown_ms;
        self.player.damage(damage);

        self.events.publish(UiEvent::BattleLog {
            text: format!("{enemy_name} hits you for {damage} damage!"),
        });
        self.events.publish(UiEvent::BattleHealthChanged {
            who: Combatant::Player,
            current: self.player.health,
            max: self.player.max_health,
        });
        self.events.publish(UiEvent::PlayerInfoChanged);

        if self.player.is_downed() {
            self.resolve_defeat();
            return;
        }

        // Chain the next swing only while the battle stays active.
        let jitter = self.rng.u64(0..ENEMY_ATTACK_JITTER_MS);
        self.scheduler
            .schedule(now + cooldown + jitter, Task::EnemyAttack { generation });
    }

    fn resolve_victory(&mut self) {
        let Some(session) = self.battle.take() else {
            return;
        };
        self.battle_generation += 1;

        // Defeated enemies stay down for the life of the area.
        if let Some(npc) = self.area.npc_mut(session.enemy.id) {
            npc.health = 0;
            npc.active = false;
        }

        let rewards = roll_rewards(session.enemy.level, &mut self.rng);
        info!(
            enemy = %session.enemy.name,
            exp = rewards.exp,
            gold = rewards.gold,
            "battle won"
        );
        self.player.gain_experience(rewards.exp);
        self.player.gold = self.player.gold.saturating_add(rewards.gold);
        for drop in &rewards.drops {
            if let Err(error) = self.player.add_item(drop.clone()) {
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
            }
        }

        self.events.publish(UiEvent::BattleLog {
            text: format!("You defeated {}!", session.enemy.name),
        });
        self.events.publish(UiEvent::BattleEnded {
            victory: true,
            exp: rewards.exp,
            gold: rewards.gold,
            drops: rewards.drops,
        });
        self.events.publish(UiEvent::PlayerInfoChanged);
        self.events.publish(UiEvent::InventoryChanged);
    }

    fn resolve_defeat(&mut self) {
        let Some(session) = self.battle.take() else {
            return;
        };
        self.battle_generation += 1;

        let restored =
            (self.player.max_health as f32 * crate::battle::DEFEAT_HEALTH_FRACTION) as u32;
        self.player.health = restored;
        info!(enemy = %session.enemy.name, "battle lost");

        self.events.publish(UiEvent::BattleLog {
            text: format!("You were defeated by {}...", session.enemy.name),
        });
        self.events.publish(UiEvent::BattleEnded {
            victory: false,
            exp: 0,
            gold: 0,
            drops: Vec::new(),
        });
        self.events.publish(UiEvent::PlayerInfoChanged);
    }

    fn open_market(&mut self, id: EntityId) {
        let name = self
            .area
            .npc(id)
            .map(|npc| npc.name.clone())
            .unwrap_or_else(|| "the merchant".to_string());
        self.events.publish(UiEvent::LogMessage {
            text: format!("{name} shows you their wares."),
        });
        self.events.publish(UiEvent::MarketOpened {
            catalog: crate::api::market_catalog(),
        });
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::ListMarket);
        }
    }

    fn cancel_interactions(&mut self) {
        if self.harvest.take().is_some() {
            debug!("harvest cancelled by new move order");
            self.events.publish(UiEvent::LogMessage {
                text: "Harvesting interrupted.".to_string(),
            });
        }
        if self.battle.is_some() {
            self.cancel_battle();
        }
    }

    fn cancel_battle(&mut self) {
        if let Some(session) = self.battle.take() {
            self.battle_generation += 1;
            debug!(enemy = %session.enemy.name, "battle abandoned");
            self.events.publish(UiEvent::BattleLog {
                text: format!("You fled from {}.", session.enemy.name),
            });
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ResourceRespawn {
                resource,
                area_generation,
            } => {
                // The task may outlive the area it was scheduled in.
                if area_generation != self.area_generation {
                    return;
                }
                if let Some(node) = self.area.resource_mut(resource) {
                    node.active = true;
                    let name = node.name.clone();
                    debug!(resource = %name, "resource respawned");
                    self.events.publish(UiEvent::LogMessage {
                        text: format!("{name} has replenished."),
                    });
                }
            }
            Task::EnemyAttack { generation } => self.fire_enemy_attack(generation),
            Task::CloseHarvestPanel { generation } => {
                if generation == self.harvest_generation {
                    self.events.publish(UiEvent::HarvestPanelClosed);
                }
            }
        }
    }

    fn push_position_update(&mut self) {
        let (x, y) = (self.player.position.x, self.player.position.y);
        let area = self.area.id.clone();
        if let Some(api) = self.api.as_mut() {
            api.send(ApiRequest::UpdatePosition { x, y, area });
        }
    }

    fn poll_api(&mut self) {
        let Some(api) = self.api.as_ref() else {
            return;
        };
        for (_, result) in api.poll() {
            let outcome = result.and_then(crate::api::ApiResponse::into_result);
            if let Err(error) = outcome {
                warn!(%error, "api request failed");
                self.events.publish(UiEvent::LogMessage {
                    text: error.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_pair;
    use crate::area::ResourceKind;
    use crate::inventory::Backpack;
    use crate::player::Skill;

    /// Walks the player onto the first resource of the given kind and
    /// returns its ID.
    fn walk_to_resource(state: &mut GameState, kind: ResourceKind) -> EntityId {
        let resource = state
            .area()
            .resources
            .iter()
            .find(|resource| resource.kind == kind)
            .expect("resource")
            .clone();
        state.handle_click(resource.position);
        state.advance(4000); // plenty to cross the map
        resource.id
    }

    fn walk_to_enemy(state: &mut GameState) -> EntityId {
        let enemy = state
            .area()
            .npcs
            .iter()
            .find(|npc| npc.kind.is_hostile())
            .expect("enemy")
            .clone();
        state.handle_click(enemy.position);
        while !state.in_battle() {
            state.tick();
        }
        enemy.id
    }

    #[test]
    fn test_click_empty_space_moves_player() {
        let mut state = GameState::with_seed("p", 1);
        let destination = Position::new(600.0, 500.0);
        state.handle_click(destination);
        state.advance(3000);
        assert_eq!(state.player().position, destination);
    }

    #[test]
    fn test_harvest_end_to_end() {
        let mut state = GameState::with_seed("p", 1);
        let resource_id = walk_to_resource(&mut state, ResourceKind::Ore);
        assert!(state.is_harvesting());

        // Harvest takes 3 seconds from arrival.
        state.advance(3100);
        assert!(!state.is_harvesting());
        assert_eq!(state.player().backpack.len(), 1);
        let stack = &state.player().backpack.items()[0];
        assert_eq!(stack.name, "Iron Ore");
        assert!((1..=3).contains(&stack.quantity));
        assert!(!state.area().resource(resource_id).expect("node").active);

        // The skill trained by ore gathering advanced.
        assert!(state.player().skills.level(Skill::Mining) > 1.0);

        // The node comes back 10 seconds later.
        state.advance(10_100);
        assert!(state.area().resource(resource_id).expect("node").active);
    }

    #[test]
    fn test_harvest_stacks_on_repeat() {
        let mut state = GameState::with_seed("p", 2);
        walk_to_resource(&mut state, ResourceKind::Ore);
        state.advance(3100);
        let first_quantity = state.player().backpack.items()[0].quantity;

        // Wait out the respawn and harvest the same node again.
        state.advance(10_100);
        walk_to_resource(&mut state, ResourceKind::Ore);
        state.advance(3100);

        assert_eq!(state.player().backpack.len(), 1);
        assert!(state.player().backpack.items()[0].quantity > first_quantity);
    }

    #[test]
    fn test_new_move_order_cancels_harvest() {
        let mut state = GameState::with_seed("p", 3);
        walk_to_resource(&mut state, ResourceKind::Ore);
        assert!(state.is_harvesting());

        state.handle_click(Position::new(600.0, 500.0));
        assert!(!state.is_harvesting());

        // No loot ever arrives from the cancelled session.
        state.advance(5000);
        assert!(state.player().backpack.is_empty());
    }

    #[test]
    fn test_full_backpack_leaves_node_intact() {
        let mut state = GameState::with_seed("p", 4);
        // A zero-slot pack cannot accept the loot.
        state.player.backpack = Backpack::new(0);
        let resource_id = walk_to_resource(&mut state, ResourceKind::Ore);
        state.advance(3100);

        assert!(state.player().backpack.is_empty());
        assert!(state.area().resource(resource_id).expect("node").active);
    }

    #[test]
    fn test_battle_victory_in_three_hits() {
        let mut state = GameState::with_seed("p", 5);
        let enemy_id = walk_to_enemy(&mut state);

        // Strength 10 -> 10 damage; the slime has 30 health.
        state.attack();
        state.attack();
        assert!(state.in_battle());
        state.attack();
        assert!(!state.in_battle());

        // Slime is level 1: exp 10 + 1*5, gold 5 + (0..=9)*1.
        assert_eq!(state.player().exp, 15);
        let gold = state.player().gold;
        assert!((55..=64).contains(&gold), "gold out of range: {gold}");

        // The defeated enemy stays down; enemies do not respawn.
        let npc = state.area().npc(enemy_id).expect("npc");
        assert!(!npc.active);
        state.advance(30_000);
        assert!(!state.area().npc(enemy_id).expect("npc").active);

        let ended = state
            .events()
            .drain()
            .into_iter()
            .filter(|event| matches!(event, UiEvent::BattleEnded { victory: true, .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_enemy_attack_chain_damages_player() {
        let mut state = GameState::with_seed("p", 6);
        walk_to_enemy(&mut state);
        let start_health = state.player().health;

        // First swing lands 1.5s after battle start.
        state.advance(1600);
        assert_eq!(state.player().health, start_health - 4);

        // And keeps coming while the battle stays active.
        state.advance(2100);
        assert!(state.player().health < start_health - 4);
    }

    #[test]
    fn test_defeat_restores_third_of_max_health() {
        let mut state = GameState::with_seed("p", 7);
        state.player.damage(97); // 3 health left; one swing downs us
        walk_to_enemy(&mut state);

        state.advance(1600);
        assert!(!state.in_battle());
        assert_eq!(state.player().health, 30);

        let events = state.events().drain();
        assert!(events
            .iter()
            .any(|event| matches!(event, UiEvent::BattleEnded { victory: false, .. })));
    }

    #[test]
    fn test_fleeing_silences_pending_attacks() {
        let mut state = GameState::with_seed("p", 8);
        walk_to_enemy(&mut state);
        let health = state.player().health;

        // Flee by moving away before the first swing.
        state.handle_click(Position::new(600.0, 100.0));
        assert!(!state.in_battle());

        // The already-scheduled swing fires into a stale generation.
        state.advance(3000);
        assert_eq!(state.player().health, health);
    }

    #[test]
    fn test_attack_without_battle_is_noop() {
        let mut state = GameState::with_seed("p", 9);
        state.attack();
        assert!(!state.in_battle());
        assert_eq!(state.player().exp, 0);
    }

    #[test]
    fn test_exit_changes_area() {
        let mut state = GameState::with_seed("p", 10);
        let exit = state.area().exits[0].clone();
        state.handle_click(exit.position);
        state.advance(5000);

        assert_eq!(state.area().id.as_str(), "forest");
        let events = state.events().drain();
        assert!(events
            .iter()
            .any(|event| matches!(event, UiEvent::AreaChanged { area_name } if area_name == "Dense Forest")));
    }

    #[test]
    fn test_respawn_timer_dies_with_area() {
        let mut state = GameState::with_seed("p", 11);
        walk_to_resource(&mut state, ResourceKind::Ore);
        state.advance(3100); // harvest done, respawn pending

        let exit = state.area().exits[0].clone();
        state.handle_click(exit.position);
        state.advance(5000);
        assert_eq!(state.area().id.as_str(), "forest");

        // The town respawn fires here and must not touch the forest.
        let forest_before = state.area().resources.clone();
        state.advance(11_000);
        for (before, after) in forest_before.iter().zip(state.area().resources.iter()) {
            assert_eq!(before.active, after.active);
        }
    }

    #[test]
    fn test_merchant_opens_market() {
        let mut state = GameState::with_seed("p", 12);
        let merchant = state
            .area()
            .npcs
            .iter()
            .find(|npc| npc.kind == NpcKind::Merchant)
            .expect("merchant")
            .clone();
        state.handle_click(merchant.position);
        state.advance(4000);

        let events = state.events().drain();
        assert!(events.iter().any(
            |event| matches!(event, UiEvent::MarketOpened { catalog } if catalog.len() == 3)
        ));
    }

    #[test]
    fn test_buy_and_attack_with_more_strength() {
        let mut state = GameState::with_seed("p", 13);
        state.player.gold = 200;
        state.player.attributes.strength = 14;
        let catalog = crate::api::market_catalog();
        state.buy_item(&catalog[1]).expect("buy sword");

        let _ = walk_to_enemy(&mut state);
        state.attack(); // 5 + 14/2 = 12 damage
        let snapshot = state.snapshot();
        assert_eq!(snapshot.battle.expect("battle").health, 18);
    }

    #[test]
    fn test_harvest_progress_events_monotone() {
        let mut state = GameState::with_seed("p", 14);
        let herb = state
            .area()
            .resources
            .iter()
            .find(|resource| resource.kind == ResourceKind::Herb)
            .expect("herb")
            .position;
        state.handle_click(herb);
        while !state.is_harvesting() {
            state.tick();
        }
        state.events().drain();

        state.advance(3100);
        let mut last = 0;
        for event in state.events().drain() {
            if let UiEvent::HarvestProgress { percent, .. } = event {
                assert!(percent >= last, "progress went backwards");
                last = percent;
            }
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_harvest_panel_autocloses() {
        let mut state = GameState::with_seed("p", 15);
        walk_to_resource(&mut state, ResourceKind::Ore);
        state.advance(3100);
        state.events().drain();

        state.advance(2100);
        let events = state.events().drain();
        assert!(events
            .iter()
            .any(|event| matches!(event, UiEvent::HarvestPanelClosed)));
    }

    #[test]
    fn test_regen_only_outside_battle() {
        let mut state = GameState::with_seed("p", 16);
        state.player.damage(50);
        state.request_regen();
        assert_eq!(state.player().health, 52);

        walk_to_enemy(&mut state);
        let in_battle_health = state.player().health;
        state.request_regen();
        assert_eq!(state.player().health, in_battle_health);
    }

    #[test]
    fn test_api_rejection_surfaces_in_log() {
        let mut state = GameState::with_seed("p", 17);
        let (mut client, server) = mock_pair();
        client.send(ApiRequest::ListResources {
            area: AreaId::new("nowhere"),
        });
        server.pump();
        state.attach_api(client);
        state.events().drain();

        state.tick();
        let events = state.events().drain();
        assert!(events.iter().any(|event| matches!(
            event,
            UiEvent::LogMessage { text } if text.contains("unknown area")
        )));
    }

    #[test]
    fn test_snapshot_is_pure() {
        let mut state = GameState::with_seed("p", 18);
        walk_to_resource(&mut state, ResourceKind::Ore);
        let before = state.snapshot();
        let again = state.snapshot();
        assert_eq!(before, again);
    }

    #[test]
    fn test_buy_failure_surfaces_wrapped_error() {
        use crate::error::EmbervaleError;
        use crate::inventory::InventoryError;

        let mut state = GameState::with_seed("p", 20);
        state.player.gold = 0;
        let catalog = crate::api::market_catalog();

        let result = state.buy_item(&catalog[0]);
        assert!(matches!(
            result,
            Err(EmbervaleError::Inventory(InventoryError::InsufficientGold { needed: 20, have: 0 }))
        ));
        // Rejected purchases change nothing but the activity log.
        assert!(state.player().backpack.is_empty());
        let events = state.events().drain();
        assert!(events
            .iter()
            .any(|event| matches!(event, UiEvent::LogMessage { text } if text.contains("insufficient gold"))));
    }

    #[test]
    fn test_distribute_attribute() {
        let mut state = GameState::with_seed("p", 19);
        assert!(!state.distribute_attribute(Attribute::Strength));

        state.player.gain_experience(100);
        assert!(state.distribute_attribute(Attribute::Strength));
        assert_eq!(state.player().attributes.strength, 11);
    }
}
