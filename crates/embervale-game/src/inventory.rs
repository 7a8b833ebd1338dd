//! Inventory and equipment: mutation rules for carrying, trading, and
//! equipping items.
//!
//! All operations return a result and never panic for expected failures
//! (insufficient gold, missing item, wrong kind). The UI decides how to
//! surface a failure; the rules here only guarantee state stays untouched
//! when an operation is rejected.

use embervale_common::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::item::{Item, ItemKind};
use crate::player::Player;

/// Default number of distinct stacks a backpack holds.
pub const DEFAULT_BACKPACK_CAPACITY: usize = 20;

/// Fraction of the list price received when selling, in percent.
const SELL_PRICE_PERCENT: u32 = 5;
/// Sale price for items without a list price.
const FALLBACK_SELL_PRICE: u32 = 1;
/// Health restored by a healing consumable.
const HEAL_AMOUNT: u32 = 50;

/// Inventory error types.
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    /// Backpack has no free stack slot
    #[error("backpack full: capacity {capacity}")]
    Full {
        /// Stack capacity
        capacity: usize,
    },
    /// Item not present where the operation expected it
    #[error("item not found")]
    NotFound,
    /// Not enough gold for a purchase
    #[error("insufficient gold: need {needed}, have {have}")]
    InsufficientGold {
        /// Price of the item
        needed: u32,
        /// Gold on hand
        have: u32,
    },
    /// Item kind does not support the operation
    #[error("item is not {expected}")]
    WrongKind {
        /// What the operation required
        expected: &'static str,
    },
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Ordered item storage with a stack-slot capacity.
///
/// Order is insertion order; the UI displays slots in this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backpack {
    items: Vec<Item>,
    capacity: usize,
}

impl Default for Backpack {
    fn default() -> Self {
        Self::new(DEFAULT_BACKPACK_CAPACITY)
    }
}

impl Backpack {
    /// Creates a backpack with the given stack capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// All carried items in display order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of occupied stack slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the backpack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stack-slot capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up an item by instance ID.
    #[must_use]
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Total quantity carried of items with the given name.
    #[must_use]
    pub fn count_named(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|item| item.name == name)
            .map(|item| item.quantity)
            .sum()
    }

    /// Whether `item` could be added right now (merges into an existing
    /// stack or a free slot is available).
    #[must_use]
    pub fn has_room_for(&self, item: &Item) -> bool {
        self.items.iter().any(|held| held.stacks_with(item)) || self.items.len() < self.capacity
    }

    /// Adds an item, merging into an existing stack when the stacking rule
    /// allows it.
    pub fn add(&mut self, item: Item) -> InventoryResult<()> {
        if let Some(held) = self.items.iter_mut().find(|held| held.stacks_with(&item)) {
            held.quantity += item.quantity;
            return Ok(());
        }
        if self.items.len() >= self.capacity {
            return Err(InventoryError::Full {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Adds an item without the capacity check.
    ///
    /// Used for unequipping: an item coming off an equipment slot must never
    /// be stranded with nowhere to go.
    pub fn add_unchecked(&mut self, item: Item) {
        if let Some(held) = self.items.iter_mut().find(|held| held.stacks_with(&item)) {
            held.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Removes and returns an entire entry by instance ID.
    pub fn take(&mut self, id: ItemId) -> InventoryResult<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(InventoryError::NotFound)?;
        Ok(self.items.remove(index))
    }

    /// Removes one unit from a stack, dropping the entry when it empties.
    ///
    /// Returns a description of the consumed item.
    pub fn consume_one(&mut self, id: ItemId) -> InventoryResult<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(InventoryError::NotFound)?;
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
            let mut consumed = self.items[index].clone();
            consumed.quantity = 1;
            Ok(consumed)
        } else {
            Ok(self.items.remove(index))
        }
    }
}

/// Equipped items, at most one per [`ItemKind`] slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    slots: HashMap<ItemKind, Item>,
}

impl Equipment {
    /// The item occupying a slot, if any.
    #[must_use]
    pub fn in_slot(&self, slot: ItemKind) -> Option<&Item> {
        self.slots.get(&slot)
    }

    /// Looks up an equipped item by instance ID.
    #[must_use]
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.slots.values().find(|item| item.id == id)
    }

    /// Iterates over all equipped items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.slots.values()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is equipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Puts an item into its slot, returning whatever it displaced.
    pub fn put(&mut self, item: Item) -> Option<Item> {
        self.slots.insert(item.kind, item)
    }

    /// Removes an equipped item by instance ID.
    pub fn take(&mut self, id: ItemId) -> InventoryResult<Item> {
        let slot = self
            .slots
            .iter()
            .find(|(_, item)| item.id == id)
            .map(|(&slot, _)| slot)
            .ok_or(InventoryError::NotFound)?;
        self.slots.remove(&slot).ok_or(InventoryError::NotFound)
    }
}

/// The outcome of using a consumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseOutcome {
    /// The item healed the player by this many points.
    Healed(u32),
    /// The item was consumed with no effect.
    NoEffect,
}

impl Player {
    /// Adds an item to the backpack under the stacking rule.
    pub fn add_item(&mut self, item: Item) -> InventoryResult<()> {
        self.backpack.add(item)
    }

    /// Buys a copy of a market catalog entry.
    ///
    /// Deducts the list price and mints a fresh-ID copy into the backpack.
    /// Fails without side effects when gold or backpack space is short.
    pub fn buy(&mut self, catalog_item: &Item) -> InventoryResult<Item> {
        let price = catalog_item.price.unwrap_or(0);
        if self.gold < price {
            return Err(InventoryError::InsufficientGold {
                needed: price,
                have: self.gold,
            });
        }
        if !self.backpack.has_room_for(catalog_item) {
            return Err(InventoryError::Full {
                capacity: self.backpack.capacity(),
            });
        }
        self.gold -= price;
        let bought = catalog_item.mint_copy();
        self.backpack.add(bought.clone())?;
        debug!(item = %bought.name, price, "bought item");
        Ok(bought)
    }

    /// Sells one unit of a carried item for 5% of its list price
    /// (1 gold when the item has no list price).
    ///
    /// Returns the gold credited.
    pub fn sell(&mut self, id: ItemId) -> InventoryResult<u32> {
        let item = self.backpack.find(id).ok_or(InventoryError::NotFound)?;
        let sale = match item.price {
            Some(price) => price * SELL_PRICE_PERCENT / 100,
            None => FALLBACK_SELL_PRICE,
        };
        self.backpack.consume_one(id)?;
        self.gold = self.gold.saturating_add(sale);
        Ok(sale)
    }

    /// Uses (consumes) one unit of a consumable.
    ///
    /// Items whose name marks them as healing restore a fixed amount of
    /// health. The unit is consumed either way, matching the original
    /// client: a non-healing consumable is spent with no effect.
    pub fn use_item(&mut self, id: ItemId) -> InventoryResult<UseOutcome> {
        let item = self.backpack.find(id).ok_or(InventoryError::NotFound)?;
        if item.kind != ItemKind::Consumable {
            return Err(InventoryError::WrongKind {
                expected: "consumable",
            });
        }
        let name = item.name.to_lowercase();
        let heals = name.contains("potion") || name.contains("healing") || name.contains("elixir");
        self.backpack.consume_one(id)?;
        if heals {
            self.heal(HEAL_AMOUNT);
            Ok(UseOutcome::Healed(HEAL_AMOUNT))
        } else {
            Ok(UseOutcome::NoEffect)
        }
    }

    /// Equips a carried item into its kind's slot.
    ///
    /// Any item already occupying the slot is displaced back into the
    /// backpack. Returns the displaced item, if there was one.
    pub fn equip(&mut self, id: ItemId) -> InventoryResult<Option<Item>> {
        let item = self.backpack.find(id).ok_or(InventoryError::NotFound)?;
        if !item.equippable {
            return Err(InventoryError::WrongKind {
                expected: "equippable",
            });
        }
        let item = self.backpack.take(id)?;
        let displaced = self.equipment.put(item);
        if let Some(displaced) = displaced.clone() {
            // Displacement bypasses capacity: the slot swap must not fail
            // halfway with the old item stranded.
            self.backpack.add_unchecked(displaced);
        }
        Ok(displaced)
    }

    /// Unequips an item back into the backpack.
    ///
    /// Always succeeds for an equipped item, even over capacity; an item
    /// must never be stuck in an equipment slot.
    pub fn unequip(&mut self, id: ItemId) -> InventoryResult<()> {
        let item = self.equipment.take(id)?;
        self.backpack.add_unchecked(item);
        Ok(())
    }
}
