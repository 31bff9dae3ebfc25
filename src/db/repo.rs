//! Repository layer for the durable ledger.
//!
//! `trade_events` is the append-only source of truth; `positions` is the
//! projection, written in the same transaction as each event so the two never
//! disagree on disk.

use crate::domain::{Decimal, InventoryPosition, ItemId, TimeMs, TradeEvent, TradeSide};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Append a trade event and upsert the position it produced, atomically.
    ///
    /// # Errors
    /// Returns an error if either write fails; nothing is committed in that case.
    pub async fn record_trade(
        &self,
        event: &TradeEvent,
        position: &InventoryPosition,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO trade_events (
                id, item_id, item_name, side, quantity, price_per_unit, total,
                timestamp_ms, profit_per_unit, total_profit
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.item_id.as_str())
        .bind(event.item_name.as_str())
        .bind(event.side.as_str())
        .bind(i64::from(event.quantity))
        .bind(event.price_per_unit.to_canonical_string())
        .bind(event.total.to_canonical_string())
        .bind(event.timestamp.as_i64())
        .bind(event.profit_per_unit.map(|d| d.to_canonical_string()))
        .bind(event.total_profit.map(|d| d.to_canonical_string()))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO positions (
                item_id, name, quantity, avg_buy_price, total_spent
            ) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(item_id) DO UPDATE SET
                quantity = excluded.quantity,
                avg_buy_price = excluded.avg_buy_price,
                total_spent = excluded.total_spent
            "#,
        )
        .bind(position.id.as_str())
        .bind(position.name.as_str())
        .bind(i64::from(position.quantity))
        .bind(position.avg_buy_price.to_canonical_string())
        .bind(position.total_spent.to_canonical_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Delete a position from the projection. Returns false if it did not exist.
    pub async fn delete_position(&self, id: &ItemId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM positions WHERE item_id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load all positions in creation order.
    pub async fn load_positions(&self) -> Result<Vec<InventoryPosition>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT item_id, name, quantity, avg_buy_price, total_spent
            FROM positions
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(position_from_row).collect()
    }

    /// Load the full event log in append order (oldest first).
    pub async fn load_events(&self) -> Result<Vec<TradeEvent>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, item_name, side, quantity, price_per_unit, total,
                   timestamp_ms, profit_per_unit, total_profit
            FROM trade_events
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}

fn decode_err(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

fn decimal_col(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(col)?;
    Decimal::from_str(&raw).map_err(|e| decode_err(format!("{} = {:?}: {}", col, raw, e)))
}

fn optional_decimal_col(row: &SqliteRow, col: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(col)?;
    raw.map(|s| Decimal::from_str(&s).map_err(|e| decode_err(format!("{} = {:?}: {}", col, s, e))))
        .transpose()
}

fn quantity_col(row: &SqliteRow, col: &str) -> Result<u32, sqlx::Error> {
    let raw: i64 = row.try_get(col)?;
    u32::try_from(raw).map_err(|_| decode_err(format!("{} out of range: {}", col, raw)))
}

fn position_from_row(row: &SqliteRow) -> Result<InventoryPosition, sqlx::Error> {
    Ok(InventoryPosition {
        id: ItemId::new(row.try_get("item_id")?),
        name: row.try_get("name")?,
        quantity: quantity_col(row, "quantity")?,
        avg_buy_price: decimal_col(row, "avg_buy_price")?,
        total_spent: decimal_col(row, "total_spent")?,
    })
}

fn event_from_row(row: &SqliteRow) -> Result<TradeEvent, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let side: String = row.try_get("side")?;

    Ok(TradeEvent {
        id: Uuid::parse_str(&id).map_err(|e| decode_err(format!("id = {:?}: {}", id, e)))?,
        item_id: ItemId::new(row.try_get("item_id")?),
        item_name: row.try_get("item_name")?,
        side: TradeSide::from_str(&side).map_err(decode_err)?,
        quantity: quantity_col(row, "quantity")?,
        price_per_unit: decimal_col(row, "price_per_unit")?,
        total: decimal_col(row, "total")?,
        timestamp: TimeMs::new(row.try_get("timestamp_ms")?),
        profit_per_unit: optional_decimal_col(row, "profit_per_unit")?,
        total_profit: optional_decimal_col(row, "total_profit")?,
    })
}
