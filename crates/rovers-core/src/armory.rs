//! Inventory, equipment and coins.
//!
//! The armory is the in-memory model of a player's meta-game holdings.
//! Persistence lives elsewhere; this module owns the rules:
//!
//! - Adding an item merges into an existing stack.
//! - Removing deletes the stack once the quantity runs out.
//! - Equipping puts any item already in the slot back into the inventory,
//!   then takes one unit of the new item out of it.
//!
//! All counters use checked arithmetic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use rovers_types::{
    EquipmentId, EquipmentSlot, InventoryId, InventoryItem, Item, ItemId, ItemRarity, ItemType,
    RoverEquipment, TokenId,
};

use crate::error::ArmoryError;

// ---------------------------------------------------------------------------
// Item catalog
// ---------------------------------------------------------------------------

/// Item definitions keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, Item>,
}

impl ItemCatalog {
    /// Build a catalog from item definitions.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    /// Look up an item definition.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Items of one rarity tier among `pool`, in pool order.
    pub fn pool_of_rarity<'a>(&'a self, pool: &'a [ItemId], rarity: ItemRarity) -> Vec<&'a Item> {
        pool.iter()
            .filter_map(|id| self.items.get(id))
            .filter(|item| item.rarity == rarity)
            .collect()
    }

    /// Every item definition, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Number of items defined.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are defined.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether an item type fits an equipment slot.
pub const fn fits_slot(item_type: ItemType, slot: EquipmentSlot) -> bool {
    matches!(
        (item_type, slot),
        (ItemType::Weapon, EquipmentSlot::Weapon)
            | (ItemType::Armor, EquipmentSlot::Armor)
            | (ItemType::Accessory, EquipmentSlot::Accessory)
    )
}

/// Summed stat bonuses from a rover's equipped items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EquipmentBonuses {
    /// Sum of `power_bonus`.
    pub power: i64,
    /// Sum of `defense_bonus`.
    pub defense: i64,
    /// Sum of `luck_bonus`.
    pub luck: i64,
}

// ---------------------------------------------------------------------------
// Armory
// ---------------------------------------------------------------------------

/// A player's coins, item stacks and equipped items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armory {
    coins: u64,
    inventory: BTreeMap<ItemId, InventoryItem>,
    equipment: BTreeMap<(TokenId, EquipmentSlot), RoverEquipment>,
}

impl Armory {
    /// A fresh armory with `starting_coins` and nothing else.
    pub const fn new(starting_coins: u64) -> Self {
        Self {
            coins: starting_coins,
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
        }
    }

    /// Rebuild an armory from persisted rows.
    pub fn restore(
        coins: u64,
        inventory: impl IntoIterator<Item = InventoryItem>,
        equipment: impl IntoIterator<Item = RoverEquipment>,
    ) -> Self {
        Self {
            coins,
            inventory: inventory.into_iter().map(|i| (i.item_id, i)).collect(),
            equipment: equipment
                .into_iter()
                .map(|e| ((e.rover_token_id.clone(), e.slot), e))
                .collect(),
        }
    }

    /// Coin balance.
    pub const fn coins(&self) -> u64 {
        self.coins
    }

    /// Add coins.
    pub fn credit_coins(&mut self, amount: u64) -> Result<u64, ArmoryError> {
        self.coins = self.coins.checked_add(amount).ok_or_else(|| ArmoryError::Overflow {
            context: String::from("coin balance"),
        })?;
        Ok(self.coins)
    }

    /// Spend coins, failing when the balance is short.
    pub const fn spend_coins(&mut self, amount: u64) -> Result<u64, ArmoryError> {
        match self.coins.checked_sub(amount) {
            Some(rest) => {
                self.coins = rest;
                Ok(rest)
            }
            None => Err(ArmoryError::InsufficientCoins {
                needed: amount,
                available: self.coins,
            }),
        }
    }

    /// Units held of an item.
    pub fn quantity(&self, item_id: ItemId) -> u32 {
        self.inventory.get(&item_id).map_or(0, |stack| stack.quantity)
    }

    /// Every item stack.
    pub fn inventory(&self) -> impl Iterator<Item = &InventoryItem> {
        self.inventory.values()
    }

    /// Add `quantity` units, merging into an existing stack.
    pub fn add_item(
        &mut self,
        item_id: ItemId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, ArmoryError> {
        if quantity == 0 {
            return Err(ArmoryError::ZeroQuantity);
        }
        let stack = self.inventory.entry(item_id).or_insert_with(|| InventoryItem {
            id: InventoryId::new(),
            item_id,
            quantity: 0,
            acquired_at: now,
        });
        stack.quantity = stack.quantity.checked_add(quantity).ok_or_else(|| ArmoryError::Overflow {
            context: format!("stack of {item_id}"),
        })?;
        debug!(item = %item_id, quantity = stack.quantity, "Item added to inventory");
        Ok(stack.quantity)
    }

    /// Remove `quantity` units. The stack is deleted when it would reach
    /// zero or below.
    pub fn remove_item(&mut self, item_id: ItemId, quantity: u32) -> Result<u32, ArmoryError> {
        if quantity == 0 {
            return Err(ArmoryError::ZeroQuantity);
        }
        let stack = self
            .inventory
            .get_mut(&item_id)
            .ok_or(ArmoryError::NotInInventory { item_id })?;
        if stack.quantity <= quantity {
            self.inventory.remove(&item_id);
            return Ok(0);
        }
        stack.quantity = stack.quantity.saturating_sub(quantity);
        Ok(stack.quantity)
    }

    /// What a rover has in a slot.
    pub fn equipped_in(&self, rover: &TokenId, slot: EquipmentSlot) -> Option<&RoverEquipment> {
        self.equipment.get(&(rover.clone(), slot))
    }

    /// Everything a rover has equipped.
    pub fn equipped(&self, rover: &TokenId) -> impl Iterator<Item = &RoverEquipment> {
        self.equipment
            .iter()
            .filter(move |((owner, _), _)| owner == rover)
            .map(|(_, e)| e)
    }

    /// Every equipped item across all rovers.
    pub fn all_equipment(&self) -> impl Iterator<Item = &RoverEquipment> {
        self.equipment.values()
    }

    /// Equip one unit of `item` from the inventory.
    ///
    /// Returns the item previously in the slot, which goes back into the
    /// inventory.
    pub fn equip(
        &mut self,
        rover: &TokenId,
        item: &Item,
        slot: EquipmentSlot,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemId>, ArmoryError> {
        if !fits_slot(item.item_type, slot) {
            return Err(ArmoryError::WrongSlot {
                item_id: item.id,
                slot,
            });
        }
        if self.quantity(item.id) == 0 {
            return Err(ArmoryError::NotInInventory { item_id: item.id });
        }

        let previous = self
            .equipment
            .insert(
                (rover.clone(), slot),
                RoverEquipment {
                    id: EquipmentId::new(),
                    rover_token_id: rover.clone(),
                    item_id: item.id,
                    slot,
                    equipped_at: now,
                },
            )
            .map(|e| e.item_id);

        if let Some(old) = previous {
            self.add_item(old, 1, now)?;
        }
        self.remove_item(item.id, 1)?;

        info!(rover = %rover, item = %item.name, slot = slot.as_str(), "Item equipped");
        Ok(previous)
    }

    /// Take the item out of a slot and back into the inventory.
    pub fn unequip(
        &mut self,
        rover: &TokenId,
        slot: EquipmentSlot,
        now: DateTime<Utc>,
    ) -> Result<ItemId, ArmoryError> {
        let removed = self
            .equipment
            .remove(&(rover.clone(), slot))
            .ok_or_else(|| ArmoryError::SlotEmpty {
                rover: rover.clone(),
                slot,
            })?;
        self.add_item(removed.item_id, 1, now)?;
        info!(rover = %rover, slot = slot.as_str(), "Item unequipped");
        Ok(removed.item_id)
    }

    /// Sum the bonuses of a rover's equipped items.
    ///
    /// Items missing from the catalog contribute nothing.
    pub fn equipment_bonuses(&self, rover: &TokenId, catalog: &ItemCatalog) -> EquipmentBonuses {
        self.equipped(rover)
            .filter_map(|e| catalog.get(e.item_id))
            .fold(EquipmentBonuses::default(), |acc, item| EquipmentBonuses {
                power: acc.power.saturating_add(i64::from(item.power_bonus)),
                defense: acc.defense.saturating_add(i64::from(item.defense_bonus)),
                luck: acc.luck.saturating_add(i64::from(item.luck_bonus)),
            })
    }

    /// Credit an expedition reward.
    pub fn claim_reward(
        &mut self,
        item: Option<ItemId>,
        coins: u32,
        now: DateTime<Utc>,
    ) -> Result<(), ArmoryError> {
        if let Some(item_id) = item {
            self.add_item(item_id, 1, now)?;
        }
        self.credit_coins(u64::from(coins))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(name: &str, item_type: ItemType, power: i32, defense: i32, luck: i32) -> Item {
        Item {
            id: ItemId::new(),
            name: name.to_owned(),
            description: None,
            item_type,
            rarity: ItemRarity::Rare,
            power_bonus: power,
            defense_bonus: defense,
            luck_bonus: luck,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn starts_with_coins_only() {
        let armory = Armory::new(100);
        assert_eq!(armory.coins(), 100);
        assert_eq!(armory.inventory().count(), 0);
    }

    #[test]
    fn add_merges_stacks() {
        let mut armory = Armory::new(0);
        let id = ItemId::new();
        armory.add_item(id, 2, Utc::now()).unwrap();
        armory.add_item(id, 3, Utc::now()).unwrap();
        assert_eq!(armory.quantity(id), 5);
        assert_eq!(armory.inventory().count(), 1);
    }

    #[test]
    fn remove_decrements_then_deletes() {
        let mut armory = Armory::new(0);
        let id = ItemId::new();
        armory.add_item(id, 3, Utc::now()).unwrap();
        assert_eq!(armory.remove_item(id, 1).unwrap(), 2);
        assert_eq!(armory.remove_item(id, 5).unwrap(), 0);
        assert_eq!(armory.quantity(id), 0);
        assert_eq!(
            armory.remove_item(id, 1),
            Err(ArmoryError::NotInInventory { item_id: id })
        );
        assert_eq!(armory.remove_item(id, 0), Err(ArmoryError::ZeroQuantity));
    }

    #[test]
    fn equip_swaps_previous_item_back() {
        let mut armory = Armory::new(0);
        let rover = TokenId::new("42");
        let blade = item("Plasma Blade", ItemType::Weapon, 10, 0, 2);
        let hammer = item("Arc Hammer", ItemType::Weapon, 15, 0, 0);
        armory.add_item(blade.id, 1, Utc::now()).unwrap();
        armory.add_item(hammer.id, 1, Utc::now()).unwrap();

        assert_eq!(armory.equip(&rover, &blade, EquipmentSlot::Weapon, Utc::now()).unwrap(), None);
        assert_eq!(armory.quantity(blade.id), 0);

        let previous = armory.equip(&rover, &hammer, EquipmentSlot::Weapon, Utc::now()).unwrap();
        assert_eq!(previous, Some(blade.id));
        assert_eq!(armory.quantity(blade.id), 1);
        assert_eq!(armory.quantity(hammer.id), 0);
        assert_eq!(
            armory.equipped_in(&rover, EquipmentSlot::Weapon).unwrap().item_id,
            hammer.id
        );
    }

    #[test]
    fn equip_requires_inventory_and_matching_slot() {
        let mut armory = Armory::new(0);
        let rover = TokenId::new("42");
        let plate = item("Plate", ItemType::Armor, 0, 8, 0);
        assert!(matches!(
            armory.equip(&rover, &plate, EquipmentSlot::Armor, Utc::now()),
            Err(ArmoryError::NotInInventory { .. })
        ));
        armory.add_item(plate.id, 1, Utc::now()).unwrap();
        assert!(matches!(
            armory.equip(&rover, &plate, EquipmentSlot::Weapon, Utc::now()),
            Err(ArmoryError::WrongSlot { .. })
        ));
        assert_eq!(armory.quantity(plate.id), 1);
    }

    #[test]
    fn unequip_returns_item() {
        let mut armory = Armory::new(0);
        let rover = TokenId::new("7");
        let charm = item("Charm", ItemType::Accessory, 0, 0, 5);
        armory.add_item(charm.id, 1, Utc::now()).unwrap();
        armory.equip(&rover, &charm, EquipmentSlot::Accessory, Utc::now()).unwrap();
        assert_eq!(armory.unequip(&rover, EquipmentSlot::Accessory, Utc::now()).unwrap(), charm.id);
        assert_eq!(armory.quantity(charm.id), 1);
        assert!(matches!(
            armory.unequip(&rover, EquipmentSlot::Accessory, Utc::now()),
            Err(ArmoryError::SlotEmpty { .. })
        ));
    }

    #[test]
    fn bonuses_sum_equipped_items_only() {
        let mut armory = Armory::new(0);
        let rover = TokenId::new("1");
        let other = TokenId::new("2");
        let blade = item("Blade", ItemType::Weapon, 10, 1, 2);
        let plate = item("Plate", ItemType::Armor, 0, 8, -1);
        let spare = item("Spare", ItemType::Weapon, 99, 99, 99);
        let catalog = ItemCatalog::new([blade.clone(), plate.clone(), spare.clone()]);
        for i in [&blade, &plate, &spare] {
            armory.add_item(i.id, 1, Utc::now()).unwrap();
        }
        armory.equip(&rover, &blade, EquipmentSlot::Weapon, Utc::now()).unwrap();
        armory.equip(&rover, &plate, EquipmentSlot::Armor, Utc::now()).unwrap();
        armory.equip(&other, &spare, EquipmentSlot::Weapon, Utc::now()).unwrap();

        assert_eq!(
            armory.equipment_bonuses(&rover, &catalog),
            EquipmentBonuses {
                power: 10,
                defense: 9,
                luck: 1
            }
        );
    }

    #[test]
    fn coins_and_rewards() {
        let mut armory = Armory::new(100);
        let prize = ItemId::new();
        armory.claim_reward(Some(prize), 40, Utc::now()).unwrap();
        assert_eq!(armory.coins(), 140);
        assert_eq!(armory.quantity(prize), 1);
        assert_eq!(armory.spend_coins(40).unwrap(), 100);
        assert_eq!(
            armory.spend_coins(101),
            Err(ArmoryError::InsufficientCoins {
                needed: 101,
                available: 100
            })
        );
    }

    #[test]
    fn catalog_filters_pool_by_rarity() {
        let a = item("A", ItemType::Weapon, 1, 0, 0);
        let mut b = item("B", ItemType::Weapon, 1, 0, 0);
        b.rarity = ItemRarity::Legendary;
        let catalog = ItemCatalog::new([a.clone(), b.clone()]);
        let pool = [a.id, b.id, ItemId::new()];
        let rare = catalog.pool_of_rarity(&pool, ItemRarity::Rare);
        assert_eq!(rare.len(), 1);
        assert_eq!(rare[0].name, "A");
        assert!(catalog.pool_of_rarity(&pool, ItemRarity::Epic).is_empty());
    }

    #[test]
    fn restore_rebuilds_equal_armory() {
        let mut armory = Armory::new(75);
        let rover = TokenId::new("9");
        let blade = item("Blade", ItemType::Weapon, 4, 0, 0);
        armory.add_item(blade.id, 2, Utc::now()).unwrap();
        armory.equip(&rover, &blade, EquipmentSlot::Weapon, Utc::now()).unwrap();

        let restored = Armory::restore(
            armory.coins(),
            armory.inventory().cloned(),
            armory.all_equipment().cloned(),
        );
        assert_eq!(restored, armory);
        assert_eq!(restored.all_equipment().count(), 1);
    }
}
