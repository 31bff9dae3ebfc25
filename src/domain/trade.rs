//! Trade event: an immutable record of one BUY or SELL.

use crate::domain::{Decimal, ItemId, TimeMs, TradeSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One executed BUY or SELL. Never mutated once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub id: Uuid,
    /// Position key at the time of the trade.
    pub item_id: ItemId,
    /// Display name snapshot at the time of the trade.
    pub item_name: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    /// quantity × price_per_unit
    pub total: Decimal,
    pub timestamp: TimeMs,
    /// SELL only: price_per_unit − average cost at sale time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_per_unit: Option<Decimal>,
    /// SELL only: profit_per_unit × quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_profit: Option<Decimal>,
}

impl TradeEvent {
    /// Build a BUY event with a fresh id. `None` if the total overflows.
    pub fn buy(
        item_id: ItemId,
        item_name: String,
        quantity: u32,
        price_per_unit: Decimal,
        timestamp: TimeMs,
    ) -> Option<Self> {
        let total = Decimal::from(quantity).checked_mul(price_per_unit)?;
        Some(Self {
            id: Uuid::new_v4(),
            item_id,
            item_name,
            side: TradeSide::Buy,
            quantity,
            price_per_unit,
            total,
            timestamp,
            profit_per_unit: None,
            total_profit: None,
        })
    }

    /// Build a SELL event against the given average cost.
    ///
    /// Returns `None` if the total or the profit figures overflow.
    pub fn sell(
        item_id: ItemId,
        item_name: String,
        quantity: u32,
        price_per_unit: Decimal,
        avg_buy_price: Decimal,
        timestamp: TimeMs,
    ) -> Option<Self> {
        let qty = Decimal::from(quantity);
        let total = qty.checked_mul(price_per_unit)?;
        let profit_per_unit = price_per_unit.checked_sub(avg_buy_price)?;
        let total_profit = profit_per_unit.checked_mul(qty)?;
        Some(Self {
            id: Uuid::new_v4(),
            item_id,
            item_name,
            side: TradeSide::Sell,
            quantity,
            price_per_unit,
            total,
            timestamp,
            profit_per_unit: Some(profit_per_unit),
            total_profit: Some(total_profit),
        })
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}
