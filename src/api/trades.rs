use crate::api::AppState;
use crate::domain::{Decimal, InventoryPosition, ItemId, TradeEvent};
use crate::engine::Applied;
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub name: String,
    pub quantity: u32,
    pub price_per_unit: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub item_id: String,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub position: InventoryPosition,
    pub trade: TradeEvent,
}

impl From<Applied> for TradeResponse {
    fn from(applied: Applied) -> Self {
        Self {
            position: applied.position,
            trade: applied.event,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub trades: Vec<TradeEvent>,
}

pub async fn record_purchase(
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<TradeResponse>), AppError> {
    let applied = state
        .store
        .record_purchase(&req.name, req.quantity, req.price_per_unit)
        .await?;
    Ok((StatusCode::CREATED, Json(applied.into())))
}

pub async fn record_sale(
    State(state): State<AppState>,
    Json(req): Json<SaleRequest>,
) -> Result<(StatusCode, Json<TradeResponse>), AppError> {
    let applied = state
        .store
        .record_sale(&ItemId::new(req.item_id), req.quantity, req.price)
        .await?;
    Ok((StatusCode::CREATED, Json(applied.into())))
}

/// Trade history, most recent first.
pub async fn list_trades(
    Query(params): Query<TradesQuery>,
    State(state): State<AppState>,
) -> Json<TradesResponse> {
    Json(TradesResponse {
        trades: state.store.list_events(params.limit).await,
    })
}
