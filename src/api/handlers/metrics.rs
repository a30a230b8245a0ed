use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Prometheus scrape endpoint. Point-in-time gauges are sampled on scrape.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    gauge!("alert_log_entries").set(state.alert_log.len() as f64);
    gauge!("dashboard_clients").set(state.ws_tx.receiver_count() as f64);

    ([(CONTENT_TYPE, PROMETHEUS_TEXT)], state.metrics_handle.render())
}
