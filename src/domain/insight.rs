//! Market insight returned by the advisory gateway.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Direction the advisor believes the market is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketTrend {
    Up,
    Down,
    Stable,
}

/// Suggested resale price with free-text reasoning. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsight {
    pub suggested_selling_price: Decimal,
    pub reasoning: String,
    pub market_trend: MarketTrend,
}

impl MarketInsight {
    pub const FALLBACK_REASONING: &'static str =
        "Standard 20% markup applied (Market data unavailable).";

    /// Deterministic local suggestion: average cost plus 20%.
    ///
    /// Clamps to the largest representable price when the markup overflows.
    pub fn fallback(average_buy_price: Decimal) -> Self {
        Self {
            suggested_selling_price: average_buy_price.saturating_mul(Decimal::markup_factor()),
            reasoning: Self::FALLBACK_REASONING.to_string(),
            market_trend: MarketTrend::Stable,
        }
    }
}
