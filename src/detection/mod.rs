pub mod squeeze;
pub mod tx_dedup;
pub mod whale;

pub use squeeze::{SqueezeConfig, SqueezeDetector};
pub use tx_dedup::TxDedup;
pub use whale::{shorten_wallet, WhaleConfig, WhaleDetector};

use crate::models::MarketMeta;

/// Lookup from a condition id to human-readable market metadata.
///
/// A miss means the market is unknown or delisted; detectors skip the trade.
pub trait MarketResolver: Send + Sync {
    fn resolve(&self, condition_id: &str) -> Option<MarketMeta>;
}

/// Truncate epoch seconds for alert payloads.
pub(crate) fn epoch_secs(ts: f64) -> i64 {
    ts.trunc() as i64
}
