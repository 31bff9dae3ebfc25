//! Event application: folds a single BUY or SELL into inventory state.
//!
//! Every function here is pure. They read the current positions and return the
//! updated position together with the finalized event; committing the result is
//! left to the caller so a failed write never leaves partial state behind.

use crate::domain::{Decimal, InventoryPosition, ItemId, TimeMs, TradeEvent};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid trade input: {0}")]
    InvalidTradeInput(String),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },
}

/// Visible inventory positions, kept in insertion order for stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Positions(Vec<InventoryPosition>);

impl Positions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, id: &ItemId) -> Option<&InventoryPosition> {
        self.0.iter().find(|p| &p.id == id)
    }

    /// Insert a position, replacing any existing one with the same id in place.
    pub fn upsert(&mut self, position: InventoryPosition) {
        match self.0.iter_mut().find(|p| p.id == position.id) {
            Some(existing) => *existing = position,
            None => self.0.push(position),
        }
    }

    /// Remove a position by id, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<InventoryPosition> {
        let idx = self.0.iter().position(|p| &p.id == id)?;
        Some(self.0.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryPosition> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<InventoryPosition> {
        self.0.clone()
    }
}

impl FromIterator<InventoryPosition> for Positions {
    fn from_iter<I: IntoIterator<Item = InventoryPosition>>(iter: I) -> Self {
        let mut positions = Positions::new();
        for position in iter {
            positions.upsert(position);
        }
        positions
    }
}

/// Result of applying one trade: the new state of the touched position and the
/// event to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub position: InventoryPosition,
    pub event: TradeEvent,
}

/// Figures a prospective sale would produce, without committing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePreview {
    pub item_id: ItemId,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    pub total: Decimal,
    pub profit_per_unit: Decimal,
    pub total_profit: Decimal,
    pub available: u32,
    pub sufficient_stock: bool,
}

fn total_overflow() -> LedgerError {
    LedgerError::InvalidTradeInput("trade total overflows".to_string())
}

fn validate_trade(quantity: u32, price_per_unit: Decimal) -> Result<(), LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::InvalidTradeInput(
            "quantity must be a positive integer".to_string(),
        ));
    }
    if !price_per_unit.is_positive() {
        return Err(LedgerError::InvalidTradeInput(format!(
            "price must be positive, got {}",
            price_per_unit
        )));
    }
    Ok(())
}

/// Apply a purchase of `quantity` units of `item_name` at `price_per_unit`.
///
/// Names are matched on their normalized key, so "Widget" and "  widget " merge
/// into one position. The display name of an existing position is kept.
pub fn apply_buy(
    positions: &Positions,
    item_name: &str,
    quantity: u32,
    price_per_unit: Decimal,
    timestamp: TimeMs,
) -> Result<Applied, LedgerError> {
    validate_trade(quantity, price_per_unit)?;
    let id = ItemId::from_name(item_name).ok_or_else(|| {
        LedgerError::InvalidTradeInput("item name must not be empty".to_string())
    })?;
    let name = item_name.trim().to_string();
    let total = Decimal::from(quantity)
        .checked_mul(price_per_unit)
        .ok_or_else(total_overflow)?;

    let position = match positions.get(&id) {
        Some(existing) => {
            let overflow =
                || LedgerError::InvalidTradeInput("position quantity overflows".to_string());
            let new_quantity = existing.quantity.checked_add(quantity).ok_or_else(overflow)?;
            let new_total_spent = existing.total_spent.checked_add(total).ok_or_else(|| {
                LedgerError::InvalidTradeInput("total spent overflows".to_string())
            })?;
            // Lifetime spend over units on hand. new_quantity >= quantity > 0.
            let new_avg = new_total_spent
                .checked_div(Decimal::from(new_quantity))
                .ok_or_else(|| {
                    LedgerError::InvalidTradeInput("average cost overflows".to_string())
                })?;

            InventoryPosition {
                id: existing.id.clone(),
                name: existing.name.clone(),
                quantity: new_quantity,
                avg_buy_price: new_avg,
                total_spent: new_total_spent,
            }
        }
        None => InventoryPosition::open(id.clone(), name.clone(), quantity, price_per_unit)
            .ok_or_else(total_overflow)?,
    };

    let event =
        TradeEvent::buy(id, name, quantity, price_per_unit, timestamp).ok_or_else(total_overflow)?;
    Ok(Applied { position, event })
}

/// Apply a sale of `quantity` units from the position `item_id` at `selling_price`.
///
/// Selling the entire remaining stock is allowed and leaves a zero-quantity
/// position in place; removal is a separate explicit action.
pub fn apply_sell(
    positions: &Positions,
    item_id: &ItemId,
    quantity: u32,
    selling_price: Decimal,
    timestamp: TimeMs,
) -> Result<Applied, LedgerError> {
    validate_trade(quantity, selling_price)?;
    let existing = positions
        .get(item_id)
        .ok_or_else(|| LedgerError::ItemNotFound(item_id.clone()))?;

    let remaining = existing
        .quantity
        .checked_sub(quantity)
        .ok_or_else(|| LedgerError::InsufficientStock {
            item_id: item_id.clone(),
            requested: quantity,
            available: existing.quantity,
        })?;

    let event = TradeEvent::sell(
        existing.id.clone(),
        existing.name.clone(),
        quantity,
        selling_price,
        existing.avg_buy_price,
        timestamp,
    )
    .ok_or_else(total_overflow)?;

    let position = InventoryPosition {
        quantity: remaining,
        ..existing.clone()
    };

    Ok(Applied { position, event })
}

/// Remove a position from the visible set. Event history is untouched.
pub fn remove_position(positions: &mut Positions, id: &ItemId) -> Option<InventoryPosition> {
    positions.remove(id)
}

/// Compute what selling `quantity` units at `price` would yield right now.
///
/// Stock is reported rather than enforced; only amounts that overflow fail.
pub fn preview_sale(
    position: &InventoryPosition,
    quantity: u32,
    price: Decimal,
) -> Result<SalePreview, LedgerError> {
    let qty = Decimal::from(quantity);
    let total = qty.checked_mul(price).ok_or_else(total_overflow)?;
    let profit_per_unit = price
        .checked_sub(position.avg_buy_price)
        .ok_or_else(total_overflow)?;
    let total_profit = profit_per_unit.checked_mul(qty).ok_or_else(total_overflow)?;
    Ok(SalePreview {
        item_id: position.id.clone(),
        quantity,
        price_per_unit: price,
        total,
        profit_per_unit,
        total_profit,
        available: position.quantity,
        sufficient_stock: quantity <= position.quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn buy(positions: &mut Positions, name: &str, qty: u32, px: &str) -> Applied {
        let applied = apply_buy(positions, name, qty, d(px), TimeMs::new(0)).unwrap();
        positions.upsert(applied.position.clone());
        applied
    }

    #[test]
    fn test_first_buy_opens_position() {
        let mut positions = Positions::new();
        let applied = buy(&mut positions, "Widget", 10, "5");

        assert_eq!(applied.position.id.as_str(), "widget");
        assert_eq!(applied.position.name, "Widget");
        assert_eq!(applied.position.quantity, 10);
        assert_eq!(applied.position.avg_buy_price, d("5"));
        assert_eq!(applied.position.total_spent, d("50"));
        assert_eq!(applied.event.total, d("50"));
        assert!(applied.event.is_buy());
        assert_eq!(applied.event.profit_per_unit, None);
    }

    #[test]
    fn test_second_buy_merges_case_insensitively() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "5");
        let applied = buy(&mut positions, "  WIDGET ", 5, "8");

        assert_eq!(positions.len(), 1);
        assert_eq!(applied.position.name, "Widget");
        assert_eq!(applied.position.quantity, 15);
        assert_eq!(applied.position.total_spent, d("90"));
        assert_eq!(applied.position.avg_buy_price, d("6"));
        assert_eq!(applied.event.item_name, "WIDGET");
    }

    #[test]
    fn test_buy_rejects_invalid_input() {
        let positions = Positions::new();
        let t = TimeMs::new(0);
        assert!(matches!(
            apply_buy(&positions, "Widget", 0, d("5"), t),
            Err(LedgerError::InvalidTradeInput(_))
        ));
        assert!(matches!(
            apply_buy(&positions, "Widget", 1, d("0"), t),
            Err(LedgerError::InvalidTradeInput(_))
        ));
        assert!(matches!(
            apply_buy(&positions, "Widget", 1, d("-1"), t),
            Err(LedgerError::InvalidTradeInput(_))
        ));
        assert!(matches!(
            apply_buy(&positions, "  ", 1, d("1"), t),
            Err(LedgerError::InvalidTradeInput(_))
        ));
    }

    #[test]
    fn test_sell_keeps_cost_basis() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "5");
        buy(&mut positions, "Widget", 5, "8");

        let id = ItemId::from_name("Widget").unwrap();
        let applied = apply_sell(&positions, &id, 6, d("10"), TimeMs::new(1)).unwrap();

        assert_eq!(applied.position.quantity, 9);
        assert_eq!(applied.position.avg_buy_price, d("6"));
        assert_eq!(applied.position.total_spent, d("90"));
        assert_eq!(applied.event.total, d("60"));
        assert_eq!(applied.event.profit_per_unit, Some(d("4")));
        assert_eq!(applied.event.total_profit, Some(d("24")));
    }

    #[test]
    fn test_sell_entire_stock_leaves_empty_position() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 3, "2");
        let id = ItemId::from_name("Widget").unwrap();

        let applied = apply_sell(&positions, &id, 3, d("2"), TimeMs::new(1)).unwrap();
        assert_eq!(applied.position.quantity, 0);
        assert!(applied.position.is_empty());
        assert_eq!(applied.event.total_profit, Some(d("0")));
    }

    #[test]
    fn test_oversell_is_rejected() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 3, "2");
        let id = ItemId::from_name("Widget").unwrap();
        let before = positions.clone();

        let err = apply_sell(&positions, &id, 4, d("2"), TimeMs::new(1)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                item_id: id,
                requested: 4,
                available: 3,
            }
        );
        assert_eq!(positions, before);
    }

    #[test]
    fn test_sell_unknown_item() {
        let positions = Positions::new();
        let id = ItemId::new("ghost".to_string());
        assert_eq!(
            apply_sell(&positions, &id, 1, d("1"), TimeMs::new(0)).unwrap_err(),
            LedgerError::ItemNotFound(id)
        );
    }

    #[test]
    fn test_buy_after_sell_spreads_lifetime_spend_over_stock_on_hand() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "5");
        let id = ItemId::from_name("Widget").unwrap();
        let sold = apply_sell(&positions, &id, 10, d("7"), TimeMs::new(1)).unwrap();
        positions.upsert(sold.position);

        let applied = buy(&mut positions, "Widget", 1, "5");
        assert_eq!(applied.position.quantity, 1);
        assert_eq!(applied.position.total_spent, d("55"));
        assert_eq!(applied.position.avg_buy_price, d("55"));
    }

    #[test]
    fn test_partial_sell_then_buy_average() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "5");
        let id = ItemId::from_name("Widget").unwrap();
        let sold = apply_sell(&positions, &id, 6, d("7"), TimeMs::new(1)).unwrap();
        positions.upsert(sold.position);

        // (50 + 4 * 5) / (4 + 4)
        let applied = buy(&mut positions, "Widget", 4, "5");
        assert_eq!(applied.position.quantity, 8);
        assert_eq!(applied.position.total_spent, d("70"));
        assert_eq!(applied.position.avg_buy_price, d("8.75"));
    }

    #[test]
    fn test_sell_with_overflowing_total_is_rejected() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "1");
        let id = ItemId::from_name("Widget").unwrap();
        let before = positions.clone();

        let huge = d("70000000000000000000000000000");
        assert!(matches!(
            apply_sell(&positions, &id, 10, huge, TimeMs::new(1)),
            Err(LedgerError::InvalidTradeInput(_))
        ));
        assert_eq!(positions, before);
    }

    #[test]
    fn test_remove_position_and_recreate_starts_fresh() {
        let mut positions = Positions::new();
        buy(&mut positions, "Widget", 10, "5");
        buy(&mut positions, "Gadget", 1, "1");
        let id = ItemId::from_name("Widget").unwrap();

        let removed = remove_position(&mut positions, &id).unwrap();
        assert_eq!(removed.quantity, 10);
        assert!(positions.get(&id).is_none());
        assert!(remove_position(&mut positions, &id).is_none());

        let applied = buy(&mut positions, "widget", 2, "9");
        assert_eq!(applied.position.total_spent, d("18"));
        assert_eq!(applied.position.avg_buy_price, d("9"));
        assert_eq!(applied.position.name, "widget");

        let order: Vec<&str> = positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["gadget", "widget"]);
    }

    #[test]
    fn test_preview_sale_reports_shortfall() {
        let mut positions = Positions::new();
        let applied = buy(&mut positions, "Widget", 2, "6");

        let preview = preview_sale(&applied.position, 5, d("5")).unwrap();
        assert_eq!(preview.total, d("25"));
        assert_eq!(preview.profit_per_unit, d("-1"));
        assert_eq!(preview.total_profit, d("-5"));
        assert_eq!(preview.available, 2);
        assert!(!preview.sufficient_stock);
    }

    #[test]
    fn test_preview_sale_overflow_is_an_error() {
        let mut positions = Positions::new();
        let applied = buy(&mut positions, "Widget", 2, "6");

        let huge = d("70000000000000000000000000000");
        assert!(matches!(
            preview_sale(&applied.position, 10, huge),
            Err(LedgerError::InvalidTradeInput(_))
        ));
    }
}
