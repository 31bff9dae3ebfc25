//! Aggregate statistics over the full event history.

use crate::domain::{Decimal, TradeEvent};
use serde::{Deserialize, Serialize};

/// Revenue, cost and realized profit across all recorded trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Sum of SELL totals.
    pub revenue: Decimal,
    /// Sum of BUY totals.
    pub cost: Decimal,
    /// Sum of SELL profits against average cost. Not `revenue - cost`.
    pub profit: Decimal,
}

/// Summarize an event history. Independent of event order.
///
/// Each figure saturates at the representable bounds instead of overflowing.
pub fn summarize(events: &[TradeEvent]) -> LedgerSummary {
    events
        .iter()
        .fold(LedgerSummary::default(), |mut acc, event| {
            if event.is_sell() {
                acc.revenue = acc.revenue.saturating_add(event.total);
                acc.profit = acc
                    .profit
                    .saturating_add(event.total_profit.unwrap_or_default());
            } else {
                acc.cost = acc.cost.saturating_add(event.total);
            }
            acc
        })
}
