use crate::api::AppState;
use crate::domain::{Decimal, InventoryPosition, ItemId, MarketInsight};
use crate::engine::{LedgerError, SalePreview};
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub positions: Vec<InventoryPosition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedResponse {
    pub removed: InventoryPosition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResponse {
    pub item_id: ItemId,
    pub insight: MarketInsight,
    /// "advisor" when the external service answered, "fallback" otherwise.
    pub source: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePreviewQuery {
    pub quantity: u32,
    pub price: String,
}

pub async fn list_positions(State(state): State<AppState>) -> Json<PositionsResponse> {
    Json(PositionsResponse {
        positions: state.store.list_positions().await,
    })
}

pub async fn remove_position(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = state.store.remove_item(&ItemId::new(id)).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Suggested selling price for a held item.
///
/// The position is read once and the lock released before the advisor is
/// awaited; a later sale re-reads stock on its own.
pub async fn get_advice(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AdviceResponse>, AppError> {
    let item_id = ItemId::new(id);
    let position = state
        .store
        .get_position(&item_id)
        .await
        .ok_or_else(|| LedgerError::ItemNotFound(item_id.clone()))?;

    let advice = state
        .advisory
        .fetch_advice(&position.name, position.avg_buy_price)
        .await;

    Ok(Json(AdviceResponse {
        item_id,
        source: advice.source(),
        insight: advice.into_insight(),
    }))
}

pub async fn get_sale_preview(
    Path(id): Path<String>,
    Query(params): Query<SalePreviewQuery>,
    State(state): State<AppState>,
) -> Result<Json<SalePreview>, AppError> {
    let price = Decimal::from_str(&params.price)
        .map_err(|_| AppError::BadRequest("Invalid price".into()))?;

    let preview = state
        .store
        .preview_sale(&ItemId::new(id), params.quantity, price)
        .await?;
    Ok(Json(preview))
}
