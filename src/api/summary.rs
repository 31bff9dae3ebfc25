use crate::api::AppState;
use crate::engine::LedgerSummary;
use axum::extract::State;
use axum::Json;

/// Revenue, cost and realized profit, recomputed from the full trade log.
pub async fn get_summary(State(state): State<AppState>) -> Json<LedgerSummary> {
    Json(state.store.get_summary().await)
}
