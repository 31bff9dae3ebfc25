//! Process-wide ledger state behind a single lock.
//!
//! `LedgerStore` owns the visible positions and the append-only event log. All
//! mutations hold the lock across validate, persist and commit, so a
//! check-then-decrement on stock can never interleave with another sale.

use crate::db::Repository;
use crate::domain::{Decimal, InventoryPosition, ItemId, TimeMs, TradeEvent};
use crate::engine::{
    apply_buy, apply_sell, preview_sale, remove_position, summarize, Applied, LedgerError,
    LedgerSummary, Positions, SalePreview,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[derive(Debug, Default)]
struct LedgerState {
    positions: Positions,
    /// Append order, oldest first.
    events: Vec<TradeEvent>,
    last_timestamp: Option<TimeMs>,
}

impl LedgerState {
    /// Wall-clock time, clamped so event timestamps never go backwards.
    fn next_timestamp(&self) -> TimeMs {
        let now = TimeMs::now();
        match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    fn commit(&mut self, applied: Applied) {
        self.last_timestamp = Some(applied.event.timestamp);
        self.positions.upsert(applied.position);
        self.events.push(applied.event);
    }
}

/// Owned ledger with optional durable backing.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    state: Arc<Mutex<LedgerState>>,
    repo: Option<Arc<Repository>>,
}

impl LedgerStore {
    /// An empty, memory-only ledger.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            repo: None,
        }
    }

    /// Load a ledger from the repository; subsequent mutations are written through.
    pub async fn load(repo: Arc<Repository>) -> Result<Self, StoreError> {
        let positions: Positions = repo.load_positions().await?.into_iter().collect();
        let events = repo.load_events().await?;
        let last_timestamp = events.iter().map(|e| e.timestamp).max();

        info!(
            positions = positions.len(),
            events = events.len(),
            "Loaded ledger from database"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(LedgerState {
                positions,
                events,
                last_timestamp,
            })),
            repo: Some(repo),
        })
    }

    pub fn is_durable(&self) -> bool {
        self.repo.is_some()
    }

    async fn persist(&self, applied: &Applied) -> Result<(), StoreError> {
        if let Some(repo) = &self.repo {
            repo.record_trade(&applied.event, &applied.position).await?;
        }
        Ok(())
    }

    /// Record a purchase, merging into an existing position with the same
    /// normalized name.
    pub async fn record_purchase(
        &self,
        name: &str,
        quantity: u32,
        price_per_unit: Decimal,
    ) -> Result<Applied, StoreError> {
        let mut state = self.state.lock().await;
        let timestamp = state.next_timestamp();
        let applied = apply_buy(&state.positions, name, quantity, price_per_unit, timestamp)?;
        self.persist(&applied).await?;

        info!(
            item = %applied.position.id,
            quantity,
            price = %price_per_unit,
            on_hand = applied.position.quantity,
            "Recorded purchase"
        );
        state.commit(applied.clone());
        Ok(applied)
    }

    /// Record a sale against the current stock of `item_id`.
    pub async fn record_sale(
        &self,
        item_id: &ItemId,
        quantity: u32,
        price: Decimal,
    ) -> Result<Applied, StoreError> {
        let mut state = self.state.lock().await;
        let timestamp = state.next_timestamp();
        let applied = apply_sell(&state.positions, item_id, quantity, price, timestamp)?;
        self.persist(&applied).await?;

        info!(
            item = %item_id,
            quantity,
            price = %price,
            profit = %applied.event.total_profit.unwrap_or_default(),
            on_hand = applied.position.quantity,
            "Recorded sale"
        );
        state.commit(applied.clone());
        Ok(applied)
    }

    /// Remove a position from the visible set. History is kept.
    pub async fn remove_item(&self, item_id: &ItemId) -> Result<InventoryPosition, StoreError> {
        let mut state = self.state.lock().await;
        if state.positions.get(item_id).is_none() {
            return Err(LedgerError::ItemNotFound(item_id.clone()).into());
        }
        if let Some(repo) = &self.repo {
            if !repo.delete_position(item_id).await? {
                warn!(item = %item_id, "Position was already missing from the database");
            }
        }
        let removed = remove_position(&mut state.positions, item_id)
            .ok_or_else(|| LedgerError::ItemNotFound(item_id.clone()))?;

        info!(item = %item_id, on_hand = removed.quantity, "Removed position");
        Ok(removed)
    }

    pub async fn list_positions(&self) -> Vec<InventoryPosition> {
        self.state.lock().await.positions.to_vec()
    }

    pub async fn get_position(&self, item_id: &ItemId) -> Option<InventoryPosition> {
        self.state.lock().await.positions.get(item_id).cloned()
    }

    /// Events most-recent-first, optionally truncated to `limit`.
    pub async fn list_events(&self, limit: Option<usize>) -> Vec<TradeEvent> {
        let state = self.state.lock().await;
        let take = limit.unwrap_or(state.events.len());
        state.events.iter().rev().take(take).cloned().collect()
    }

    /// Revenue, cost and profit recomputed from the full event log.
    pub async fn get_summary(&self) -> LedgerSummary {
        summarize(&self.state.lock().await.events)
    }

    /// What selling `quantity` of `item_id` at `price` would produce right now.
    pub async fn preview_sale(
        &self,
        item_id: &ItemId,
        quantity: u32,
        price: Decimal,
    ) -> Result<SalePreview, LedgerError> {
        let state = self.state.lock().await;
        let position = state
            .positions
            .get(item_id)
            .ok_or_else(|| LedgerError::ItemNotFound(item_id.clone()))?;
        preview_sale(position, quantity, price)
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
