//! Items: the unit of inventory, equipment, and trade.

use embervale_common::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of an item. Doubles as the equipment slot for equippable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Weapons (equippable, weapon slot)
    Weapon,
    /// Armor (equippable, armor slot)
    Armor,
    /// Consumables (potions and the like)
    Consumable,
    /// Raw gathered resources
    Resource,
    /// Enhancement scrolls
    Scroll,
    /// Anything else
    General,
}

/// Item rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Common drop
    Common,
    /// Uncommon drop
    Uncommon,
    /// Rare drop
    Rare,
    /// Epic drop
    Epic,
    /// Legendary drop
    Legendary,
    /// One of a kind; never stacks
    Unique,
}

/// A single inventory entry. Non-equippable, non-unique items stack via
/// `quantity`; equippable and unique items always occupy their own entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique instance ID
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Category / equipment slot
    pub kind: ItemKind,
    /// Rarity tier
    pub rarity: Rarity,
    /// Stack count (>= 1)
    pub quantity: u32,
    /// Whether the item can be equipped
    pub equippable: bool,
    /// List price in gold, if the item is sold anywhere
    pub price: Option<u32>,
    /// Flavor/description text
    pub description: String,
    /// Attribute bonuses granted while equipped
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub stat_bonuses: HashMap<String, i32>,
}

impl Item {
    /// Creates a gathered-resource stack.
    #[must_use]
    pub fn resource(name: impl Into<String>, quantity: u32, description: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind: ItemKind::Resource,
            rarity: Rarity::Common,
            quantity: quantity.max(1),
            equippable: false,
            price: Some(5),
            description: description.into(),
            stat_bonuses: HashMap::new(),
        }
    }

    /// Creates a loot drop of the given kind and rarity.
    #[must_use]
    pub fn drop_loot(name: impl Into<String>, kind: ItemKind, rarity: Rarity, quantity: u32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            rarity,
            quantity: quantity.max(1),
            equippable: false,
            price: None,
            description: String::new(),
            stat_bonuses: HashMap::new(),
        }
    }

    /// Creates a market catalog entry.
    #[must_use]
    pub fn catalog(
        name: impl Into<String>,
        kind: ItemKind,
        rarity: Rarity,
        price: u32,
        equippable: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            rarity,
            quantity: 1,
            equippable,
            price: Some(price),
            description: description.into(),
            stat_bonuses: HashMap::new(),
        }
    }

    /// Whether this item can merge into the same stack as `other`.
    ///
    /// Items stack when they share a name and kind and neither side is
    /// equippable or unique.
    #[must_use]
    pub fn stacks_with(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && !self.equippable
            && !other.equippable
            && self.rarity != Rarity::Unique
            && other.rarity != Rarity::Unique
    }

    /// Mints a copy of this item with a fresh instance ID.
    ///
    /// Used by market purchases: the catalog keeps its entry and the buyer
    /// receives a new instance.
    #[must_use]
    pub fn mint_copy(&self) -> Self {
        Self {
            id: ItemId::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_quantity_floor() {
        let item = Item::resource("Iron Ore", 0, "");
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_stacks_with_same_name_and_kind() {
        let a = Item::resource("Iron Ore", 2, "");
        let b = Item::resource("Iron Ore", 1, "");
        assert!(a.stacks_with(&b));
    }

    #[test]
    fn test_does_not_stack_across_names() {
        let a = Item::resource("Iron Ore", 1, "");
        let b = Item::resource("Oak Log", 1, "");
        assert!(!a.stacks_with(&b));
    }

    #[test]
    fn test_equippable_never_stacks() {
        let a = Item::catalog("Iron Sword", ItemKind::Weapon, Rarity::Uncommon, 100, true, "");
        let b = Item::catalog("Iron Sword", ItemKind::Weapon, Rarity::Uncommon, 100, true, "");
        assert!(!a.stacks_with(&b));
    }

    #[test]
    fn test_unique_never_stacks() {
        let mut a = Item::resource("Relic Shard", 1, "");
        let mut b = Item::resource("Relic Shard", 1, "");
        a.rarity = Rarity::Unique;
        b.rarity = Rarity::Unique;
        assert!(!a.stacks_with(&b));
    }

    #[test]
    fn test_mint_copy_fresh_id() {
        let a = Item::catalog("Healing Potion", ItemKind::Consumable, Rarity::Common, 20, false, "");
        let b = a.mint_copy();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.price, b.price);
    }
}
