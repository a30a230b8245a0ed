use std::collections::HashMap;

use metrics::counter;

use crate::models::{Alert, MarketInfo, TradeEvent, WhaleAlert};

use super::tx_dedup::TxDedup;
use super::{epoch_secs, MarketResolver};

/// Whale detection parameters.
#[derive(Debug, Clone)]
pub struct WhaleConfig {
    /// Minimum notional (USDC) for a trade to count as a whale trade.
    pub threshold_usd: f64,
    /// Per-market quiet period after an alert, in seconds.
    pub cooldown_sec: f64,
    /// Number of transaction hashes remembered for dedup.
    pub dedup_capacity: usize,
}

impl Default for WhaleConfig {
    fn default() -> Self {
        Self {
            threshold_usd: 10_000.0,
            cooldown_sec: 600.0,
            dedup_capacity: 50_000,
        }
    }
}

/// Emits a `WhaleAlert` for large trades, at most once per transaction and
/// once per market per cooldown.
pub struct WhaleDetector {
    config: WhaleConfig,
    seen_tx: TxDedup,
    cooldown_until: HashMap<String, f64>,
}

impl WhaleDetector {
    pub fn new(config: WhaleConfig) -> Self {
        let seen_tx = TxDedup::new(config.dedup_capacity);
        Self {
            config,
            seen_tx,
            cooldown_until: HashMap::new(),
        }
    }

    pub fn config(&self) -> &WhaleConfig {
        &self.config
    }

    /// Next timestamp at which `condition_id` may alert again, if any.
    pub fn cooldown_until(&self, condition_id: &str) -> Option<f64> {
        self.cooldown_until.get(condition_id).copied()
    }

    pub fn evaluate(&mut self, trade: &TradeEvent, resolver: &dyn MarketResolver) -> Option<Alert> {
        let notional = trade.notional();

        // Size filter. Trades without a usable notional pass through: the
        // feed already filtered them by cash amount.
        if let Some(usd) = notional {
            if usd < self.config.threshold_usd {
                return None;
            }
        }

        let Some(meta) = resolver.resolve(&trade.condition_id) else {
            tracing::debug!(
                condition_id = %trade.condition_id,
                "Whale: unknown market, skipping"
            );
            counter!("unresolved_markets_total").increment(1);
            return None;
        };
        let info = MarketInfo::for_trade(meta, trade);

        // Record before the cooldown check so a redelivered transaction is
        // never counted twice.
        if let Some(tx) = trade.tx_hash() {
            if !self.seen_tx.insert(tx) {
                tracing::debug!(tx = %tx, "Whale: transaction already alerted");
                counter!("whale_duplicates_total").increment(1);
                return None;
            }
        }

        let cooldown = self
            .cooldown_until
            .get(&info.condition_id)
            .copied()
            .unwrap_or(0.0);
        if trade.timestamp < cooldown {
            tracing::debug!(
                condition_id = %info.condition_id,
                remaining_secs = cooldown - trade.timestamp,
                "Whale: market in cooldown"
            );
            return None;
        }

        let (size_usd, size_known) = match notional {
            Some(usd) => (usd, true),
            None => (self.config.threshold_usd, false),
        };

        let alert = WhaleAlert {
            market_title: info.title,
            market_slug: info.slug,
            outcome_name: info.outcome_name,
            price: trade.price,
            size_usd,
            wallet: shorten_wallet(&trade.wallet),
            timestamp: epoch_secs(trade.timestamp),
            threshold_usd: self.config.threshold_usd,
            size_known,
        };

        self.cooldown_until.insert(
            info.condition_id,
            trade.timestamp + self.config.cooldown_sec,
        );

        Some(Alert::Whale(alert))
    }
}

/// `0x1234567890abcdef` → `0x1234…cdef`; wallets of 12 chars or fewer are kept.
pub fn shorten_wallet(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 12 {
        return wallet.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
