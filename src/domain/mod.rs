//! Ledger entity model.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: TimeMs, ItemId, TradeSide
//! - InventoryPosition and TradeEvent, the two ledger entities
//! - MarketInsight, the ephemeral advisory result

pub mod decimal;
pub mod insight;
pub mod position;
pub mod primitives;
pub mod trade;

pub use decimal::Decimal;
pub use insight::{MarketInsight, MarketTrend};
pub use position::InventoryPosition;
pub use primitives::{ItemId, TimeMs, TradeSide};
pub use trade::TradeEvent;
