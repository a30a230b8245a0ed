pub mod api;
pub mod config;
pub mod detection;
pub mod errors;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod polymarket;
pub mod services;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::services::alert_log::AlertLog;
use crate::services::market_catalog::MarketCatalog;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub alert_log: Arc<AlertLog>,
    pub catalog: Arc<MarketCatalog>,
}
