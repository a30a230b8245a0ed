use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TradeEvent: core pipeline message
// ---------------------------------------------------------------------------

/// A single fill observed on the trade feed. Read-only for the detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub condition_id: String,
    pub market_title: String,
    pub market_slug: String,
    pub outcome_name: String,
    pub outcome_index: u32,
    pub price: f64,
    pub size: Option<f64>,
    pub wallet: String,
    pub transaction_hash: Option<String>,
    /// Epoch seconds. Non-decreasing in feed order.
    pub timestamp: f64,
}

impl TradeEvent {
    /// `size * price` when both are usable, otherwise `None`.
    pub fn notional(&self) -> Option<f64> {
        match self.size {
            Some(size) if size.is_finite() && self.price.is_finite() => Some(size * self.price),
            _ => None,
        }
    }

    /// Transaction hash, treating an empty string as absent.
    pub fn tx_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref().filter(|h| !h.is_empty())
    }
}
