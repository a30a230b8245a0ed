use metrics::counter;
use reqwest::Client;
use thiserror::Error;

use super::types::ApiTrade;

const DATA_API_BASE: &str = "https://data-api.polymarket.com";

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, DATA_API_BASE.into())
    }

    pub fn with_base_url(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch the most recent trades across all markets, newest first.
    pub async fn get_recent_trades(&self, limit: u32) -> Result<Vec<ApiTrade>, DataClientError> {
        let url = format!("{}/trades", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("takerOnly", "true".into())])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        match body {
            serde_json::Value::Array(items) => Ok(parse_trades(items)),
            other => Err(DataClientError::Unexpected(format!(
                "expected array of trades, got {}",
                kind_of(&other)
            ))),
        }
    }
}

/// Deserialize each item on its own so one bad record does not sink the
/// batch. Rejected items are logged and counted as skipped events.
pub fn parse_trades(items: Vec<serde_json::Value>) -> Vec<ApiTrade> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ApiTrade>(item) {
            Ok(trade) => Some(trade),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable trade record");
                counter!("events_skipped_total").increment(1);
                None
            }
        })
        .collect()
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
