use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Healthy once the market catalog has loaded; without it every trade is a
/// resolution miss and no alert can fire.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let markets = state.catalog.len();
    let alerts_logged = state.alert_log.len();

    if markets > 0 {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "markets_known": markets,
                "alerts_logged": alerts_logged,
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "markets_known": 0,
                "alerts_logged": alerts_logged,
            })),
        )
    }
}
