//! Error types for battle protocol misuse and armory operations.
//!
//! Well-formed combat input never fails: missing rarity data, empty trait
//! lists and unknown abilities all have defined fallbacks. These errors
//! cover callers driving the state machine out of order and inventory
//! requests that cannot be satisfied.

use rovers_types::{BattleWinner, EquipmentSlot, ItemId, Side, TokenId};

/// Errors raised by the turn-based battle state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// A side tried to act while the other side was due.
    #[error("it is not the {side:?} side's turn")]
    NotYourTurn {
        /// The side that attempted to act.
        side: Side,
    },

    /// An action was submitted after the battle ended.
    #[error("battle already ended with winner {winner:?}")]
    AlreadyEnded {
        /// The recorded outcome.
        winner: BattleWinner,
    },
}

/// Errors raised by inventory, equipment and coin operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArmoryError {
    /// The item is not in the inventory.
    #[error("item {item_id} is not in the inventory")]
    NotInInventory {
        /// The missing item.
        item_id: ItemId,
    },

    /// Quantity zero was requested.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The item definition is unknown to the catalog.
    #[error("item {item_id} is not in the catalog")]
    UnknownItem {
        /// The unknown item.
        item_id: ItemId,
    },

    /// Nothing is equipped in the slot.
    #[error("rover {rover} has nothing equipped in the {slot:?} slot")]
    SlotEmpty {
        /// The rover whose slot was queried.
        rover: TokenId,
        /// The empty slot.
        slot: EquipmentSlot,
    },

    /// The item cannot go into the requested slot.
    #[error("item {item_id} cannot be equipped in the {slot:?} slot")]
    WrongSlot {
        /// The item being equipped.
        item_id: ItemId,
        /// The requested slot.
        slot: EquipmentSlot,
    },

    /// Not enough coins for a purchase.
    #[error("insufficient coins: need {needed}, have {available}")]
    InsufficientCoins {
        /// Coins required.
        needed: u64,
        /// Coins held.
        available: u64,
    },

    /// A counter would overflow.
    #[error("arithmetic overflow: {context}")]
    Overflow {
        /// What overflowed.
        context: String,
    },
}
