//! Shared type definitions for the Rovers arena.
//!
//! This crate is the single source of truth for the records exchanged
//! between the battle/expedition logic, the collaborator crates, and the
//! browser client. Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the rover [`TokenId`]
//! - [`enums`] -- Rarity tiers, slots, difficulties, statuses, battle sides
//! - [`structs`] -- Rovers, traits, items, expeditions, runs, log entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    BattleWinner, Difficulty, EquipmentSlot, ItemRarity, ItemType, LogEntryType, RunStatus, Side,
};
pub use ids::{EquipmentId, ExpeditionId, InventoryId, ItemId, RunId, TokenId};
pub use structs::{
    BattleLogEntry, Expedition, ExpeditionLogEntry, ExpeditionRun, InventoryItem, Item,
    RarityLookup, Rover, RoverEquipment, RoverTrait, TraitPower,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes bindings when `export_all` is invoked. Files land in
        // `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::ExpeditionId::export_all();
        let _ = crate::ids::RunId::export_all();
        let _ = crate::ids::InventoryId::export_all();
        let _ = crate::ids::EquipmentId::export_all();
        let _ = crate::ids::TokenId::export_all();

        // Enums
        let _ = crate::enums::ItemRarity::export_all();
        let _ = crate::enums::ItemType::export_all();
        let _ = crate::enums::EquipmentSlot::export_all();
        let _ = crate::enums::Difficulty::export_all();
        let _ = crate::enums::RunStatus::export_all();
        let _ = crate::enums::LogEntryType::export_all();
        let _ = crate::enums::Side::export_all();
        let _ = crate::enums::BattleWinner::export_all();

        // Structs
        let _ = crate::structs::RoverTrait::export_all();
        let _ = crate::structs::Rover::export_all();
        let _ = crate::structs::TraitPower::export_all();
        let _ = crate::structs::RarityLookup::export_all();
        let _ = crate::structs::Item::export_all();
        let _ = crate::structs::InventoryItem::export_all();
        let _ = crate::structs::RoverEquipment::export_all();
        let _ = crate::structs::Expedition::export_all();
        let _ = crate::structs::ExpeditionLogEntry::export_all();
        let _ = crate::structs::ExpeditionRun::export_all();
        let _ = crate::structs::BattleLogEntry::export_all();
    }
}
