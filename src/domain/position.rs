//! Inventory position: the materialized holdings of one item.

use crate::domain::{Decimal, ItemId};
use serde::{Deserialize, Serialize};

/// Current holdings and cost basis for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPosition {
    /// Normalized key, stable for the life of the item.
    pub id: ItemId,
    /// Display name as first entered.
    pub name: String,
    /// Units currently on hand.
    pub quantity: u32,
    /// Cost per unit: `total_spent` over the units on hand after the last BUY.
    pub avg_buy_price: Decimal,
    /// Cumulative spend over every BUY applied to this position.
    pub total_spent: Decimal,
}

impl InventoryPosition {
    /// Open a position from its first purchase. `None` if the spend overflows.
    pub fn open(id: ItemId, name: String, quantity: u32, price_per_unit: Decimal) -> Option<Self> {
        Some(Self {
            id,
            name,
            quantity,
            avg_buy_price: price_per_unit,
            total_spent: Decimal::from(quantity).checked_mul(price_per_unit)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}
