use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::alert_log::RecentAlert;
use crate::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// GET /api/alerts/recent?limit=&type=
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<RecentAlert>>, AppError> {
    let kind = query.kind.as_deref();
    if let Some(k) = kind {
        if !matches!(k, "whale" | "price_move" | "all") {
            return Err(AppError::BadRequest(format!("unknown alert type: {k}")));
        }
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .min(state.alert_log.capacity());

    Ok(Json(state.alert_log.recent(limit, kind)))
}
