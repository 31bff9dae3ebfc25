pub mod health;
pub mod positions;
pub mod summary;
pub mod trades;

use crate::advisory::AdvisoryGateway;
use crate::store::LedgerStore;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: LedgerStore,
    pub advisory: AdvisoryGateway,
}

impl AppState {
    pub fn new(store: LedgerStore, advisory: AdvisoryGateway) -> Self {
        Self { store, advisory }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/positions", get(positions::list_positions))
        .route("/v1/positions/:id", delete(positions::remove_position))
        .route("/v1/positions/:id/advice", get(positions::get_advice))
        .route(
            "/v1/positions/:id/sale-preview",
            get(positions::get_sale_preview),
        )
        .route("/v1/purchases", post(trades::record_purchase))
        .route("/v1/sales", post(trades::record_sale))
        .route("/v1/trades", get(trades::list_trades))
        .route("/v1/summary", get(summary::get_summary))
        .layer(cors)
        .with_state(state)
}
