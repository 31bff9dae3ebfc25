//! Rebuild the position projection from an event log.

use crate::domain::{TradeEvent, TradeSide};
use crate::engine::ledger::{apply_buy, apply_sell, LedgerError, Positions};

/// Fold an event log into positions using the same rules as live trading.
///
/// Events are applied in timestamp order; ties keep their input order. Removals
/// are not events, so the result matches the live projection only when no
/// position has been removed.
pub fn rebuild_positions(events: &[TradeEvent]) -> Result<Positions, LedgerError> {
    let mut ordered: Vec<&TradeEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut positions = Positions::new();
    for event in ordered {
        let applied = match event.side {
            TradeSide::Buy => apply_buy(
                &positions,
                &event.item_name,
                event.quantity,
                event.price_per_unit,
                event.timestamp,
            )?,
            TradeSide::Sell => apply_sell(
                &positions,
                &event.item_id,
                event.quantity,
                event.price_per_unit,
                event.timestamp,
            )?,
        };
        positions.upsert(applied.position);
    }
    Ok(positions)
}
