use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FeedError;
use crate::models::TradeEvent;

// ---------------------------------------------------------------------------
// Trade (Data API, REST)
// ---------------------------------------------------------------------------

/// A trade record from `GET /trades`. Numeric fields arrive as numbers or
/// numeric strings depending on the endpoint, so they are parsed lazily.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrade {
    #[serde(default)]
    pub proxy_wallet: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub event_slug: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub outcome_index: Option<Value>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl TryFrom<ApiTrade> for TradeEvent {
    type Error = FeedError;

    fn try_from(trade: ApiTrade) -> Result<Self, Self::Error> {
        let condition_id = trade
            .condition_id
            .filter(|c| !c.is_empty())
            .ok_or(FeedError::Malformed { field: "conditionId" })?;

        let price = trade
            .price
            .as_ref()
            .and_then(parse_f64)
            .ok_or(FeedError::Malformed { field: "price" })?;

        let timestamp = trade
            .timestamp
            .as_ref()
            .and_then(parse_f64)
            .map(normalize_epoch_secs)
            .ok_or(FeedError::Malformed { field: "timestamp" })?;

        let outcome_index = trade
            .outcome_index
            .as_ref()
            .and_then(parse_f64)
            .filter(|i| *i >= 0.0 && i.fract() == 0.0)
            .map(|i| i as u32)
            .ok_or(FeedError::Malformed { field: "outcomeIndex" })?;

        // An unparseable size is tolerated: the whale path falls back to
        // its threshold.
        let size = trade.size.as_ref().and_then(parse_f64);

        Ok(TradeEvent {
            condition_id,
            market_title: trade.title.unwrap_or_default(),
            market_slug: trade.event_slug.or(trade.slug).unwrap_or_default(),
            outcome_name: trade.outcome.unwrap_or_default(),
            outcome_index,
            price,
            size,
            wallet: trade.proxy_wallet.unwrap_or_default(),
            transaction_hash: trade.transaction_hash.filter(|h| !h.is_empty()),
            timestamp,
        })
    }
}

fn parse_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// If >1e12, it's milliseconds.
fn normalize_epoch_secs(ts: f64) -> f64 {
    if ts > 1_000_000_000_000.0 {
        ts / 1000.0
    } else {
        ts
    }
}
