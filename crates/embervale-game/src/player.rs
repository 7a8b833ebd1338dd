//! The player: identity, vitals, progression, and carried items.

use embervale_common::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::inventory::{Backpack, Equipment};

/// Starting health for a fresh character.
const BASE_MAX_HEALTH: u32 = 100;
/// Experience required for the first level-up.
const BASE_NEXT_LEVEL_EXP: u64 = 100;
/// Growth factor applied to the experience requirement per level.
const NEXT_LEVEL_EXP_GROWTH: f64 = 1.5;
/// Attribute points granted per level.
const POINTS_PER_LEVEL: u32 = 3;
/// Max-health gained per level.
const HEALTH_PER_LEVEL: u32 = 10;
/// Health restored by one regeneration tick.
const REGEN_PER_TICK: u32 = 2;

/// A core attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Physical power; drives melee damage
    Strength,
    /// Magical aptitude
    Intelligence,
    /// Agility and precision
    Dexterity,
    /// Toughness
    Constitution,
}

/// The player's attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Physical power
    pub strength: u32,
    /// Magical aptitude
    pub intelligence: u32,
    /// Agility
    pub dexterity: u32,
    /// Toughness
    pub constitution: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            dexterity: 10,
            constitution: 10,
        }
    }
}

impl Attributes {
    /// Returns the value of a single attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Intelligence => self.intelligence,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
        }
    }

    fn raise(&mut self, attribute: Attribute, points: u32) {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
        };
        *slot = slot.saturating_add(points);
    }
}

/// A gathering/crafting life skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Ore extraction
    Mining,
    /// Tree felling
    Woodcutting,
    /// Fishing
    Fishing,
    /// Herb gathering
    Herbalism,
    /// Item crafting
    Crafting,
}

/// Per-skill levels. Levels are fractional; gathering grants partial
/// progress toward the next whole level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillLevels {
    levels: HashMap<Skill, f32>,
}

impl Default for SkillLevels {
    fn default() -> Self {
        let mut levels = HashMap::new();
        for skill in [
            Skill::Mining,
            Skill::Woodcutting,
            Skill::Fishing,
            Skill::Herbalism,
            Skill::Crafting,
        ] {
            levels.insert(skill, 1.0);
        }
        Self { levels }
    }
}

impl SkillLevels {
    /// Returns the current level of a skill.
    #[must_use]
    pub fn level(&self, skill: Skill) -> f32 {
        self.levels.get(&skill).copied().unwrap_or(1.0)
    }

    /// Adds fractional progress to a skill.
    pub fn gain(&mut self, skill: Skill, amount: f32) {
        let entry = self.levels.entry(skill).or_insert(1.0);
        *entry += amount.max(0.0);
    }
}

/// The player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Display name
    pub username: String,
    /// Character level
    pub level: u32,
    /// Experience accumulated toward the next level
    pub exp: u64,
    /// Experience required for the next level
    pub next_level_exp: u64,
    /// Current health (0..=max_health)
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
    /// Gold on hand
    pub gold: u32,
    /// Position within the current area
    pub position: Position,
    /// Core attributes
    pub attributes: Attributes,
    /// Unspent attribute points
    pub attribute_points: u32,
    /// Life-skill levels
    pub skills: SkillLevels,
    /// Carried items, in display order
    pub backpack: Backpack,
    /// Equipped items, one per slot
    pub equipment: Equipment,
}

impl Player {
    /// Creates a fresh character at the given position.
    #[must_use]
    pub fn new(username: impl Into<String>, position: Position) -> Self {
        Self {
            username: username.into(),
            level: 1,
            exp: 0,
            next_level_exp: BASE_NEXT_LEVEL_EXP,
            health: BASE_MAX_HEALTH,
            max_health: BASE_MAX_HEALTH,
            gold: 50,
            position,
            attributes: Attributes::default(),
            attribute_points: 0,
            skills: SkillLevels::default(),
            backpack: Backpack::default(),
            equipment: Equipment::default(),
        }
    }

    /// Whether the player is at zero health.
    #[must_use]
    pub const fn is_downed(&self) -> bool {
        self.health == 0
    }

    /// Applies damage, clamping health at zero.
    pub fn damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restores health, clamping at `max_health`.
    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Grants experience and applies any level-ups it triggers.
    ///
    /// Each level-up raises the requirement by half again, grants attribute
    /// points, raises max health, and fully heals the player. Returns the
    /// number of levels gained.
    pub fn gain_experience(&mut self, amount: u64) -> u32 {
        self.exp += amount;
        let mut levels_gained = 0;
        while self.exp >= self.next_level_exp {
            self.exp -= self.next_level_exp;
            self.level += 1;
            self.next_level_exp = (self.next_level_exp as f64 * NEXT_LEVEL_EXP_GROWTH) as u64;
            self.attribute_points += POINTS_PER_LEVEL;
            self.max_health += HEALTH_PER_LEVEL;
            self.health = self.max_health;
            levels_gained += 1;
        }
        if levels_gained > 0 {
            info!(level = self.level, "player leveled up");
        }
        levels_gained
    }

    /// Spends one attribute point on the given attribute.
    ///
    /// Returns false (and changes nothing) when no points are available.
    pub fn spend_attribute_point(&mut self, attribute: Attribute) -> bool {
        if self.attribute_points == 0 {
            return false;
        }
        self.attribute_points -= 1;
        self.attributes.raise(attribute, 1);
        true
    }

    /// One passive regeneration tick. No-op at full health.
    ///
    /// Returns true if any health was restored.
    pub fn regen_tick(&mut self) -> bool {
        if self.health >= self.max_health {
            return false;
        }
        self.heal(REGEN_PER_TICK);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new("Adventurer", Position::ZERO);
        assert_eq!(player.level, 1);
        assert_eq!(player.health, 100);
        assert_eq!(player.max_health, 100);
        assert_eq!(player.gold, 50);
        assert_eq!(player.next_level_exp, 100);
        assert_eq!(player.attributes.strength, 10);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut player = Player::new("p", Position::ZERO);
        player.damage(250);
        assert_eq!(player.health, 0);
        assert!(player.is_downed());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut player = Player::new("p", Position::ZERO);
        player.damage(30);
        player.heal(500);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_single_level_up() {
        let mut player = Player::new("p", Position::ZERO);
        player.damage(40);

        let gained = player.gain_experience(120);
        assert_eq!(gained, 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.exp, 20);
        assert_eq!(player.next_level_exp, 150);
        assert_eq!(player.attribute_points, 3);
        assert_eq!(player.max_health, 110);
        // Level-up fully heals.
        assert_eq!(player.health, 110);
    }

    #[test]
    fn test_chained_level_ups() {
        let mut player = Player::new("p", Position::ZERO);
        // 100 + 150 = 250 clears two levels with 5 left over.
        let gained = player.gain_experience(255);
        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.exp, 5);
        assert_eq!(player.next_level_exp, 225);
        assert_eq!(player.attribute_points, 6);
    }

    #[test]
    fn test_spend_attribute_point() {
        let mut player = Player::new("p", Position::ZERO);
        assert!(!player.spend_attribute_point(Attribute::Strength));

        player.gain_experience(100);
        assert!(player.spend_attribute_point(Attribute::Strength));
        assert_eq!(player.attributes.strength, 11);
        assert_eq!(player.attribute_points, 2);
    }

    #[test]
    fn test_regen_tick() {
        let mut player = Player::new("p", Position::ZERO);
        assert!(!player.regen_tick());

        player.damage(10);
        assert!(player.regen_tick());
        assert_eq!(player.health, 92);
    }

    #[test]
    fn test_skill_gain() {
        let mut skills = SkillLevels::default();
        assert!((skills.level(Skill::Mining) - 1.0).abs() < f32::EPSILON);

        skills.gain(Skill::Mining, 0.15);
        assert!((skills.level(Skill::Mining) - 1.15).abs() < 1e-6);
    }
}
