pub mod advisory;
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod store;

pub use advisory::{Advice, AdvisoryError, AdvisoryGateway, GeminiAdvisor, MarketAdvisor, MockAdvisor};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Decimal, InventoryPosition, ItemId, MarketInsight, MarketTrend, TimeMs, TradeEvent, TradeSide,
};
pub use engine::{LedgerError, LedgerSummary};
pub use error::AppError;
pub use store::{LedgerStore, StoreError};
