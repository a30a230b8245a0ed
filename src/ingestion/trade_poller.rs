use std::collections::HashSet;
use std::time::Duration;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::models::TradeEvent;
use crate::polymarket::{ApiTrade, DataClient};

/// Tracks which trades have already been forwarded across overlapping polls.
///
/// Everything older than the high-water timestamp has been seen. Trades at
/// exactly the high-water second are remembered by identity, since a later
/// poll can return more trades from that same second.
#[derive(Debug, Default)]
pub struct TradeCursor {
    high_water: Option<f64>,
    boundary: HashSet<String>,
}

impl TradeCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn high_water(&self) -> Option<f64> {
        self.high_water
    }

    /// Return unseen trades oldest first and advance the cursor.
    pub fn advance(&mut self, mut batch: Vec<TradeEvent>) -> Vec<TradeEvent> {
        batch.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let fresh: Vec<TradeEvent> = batch
            .into_iter()
            .filter(|t| match self.high_water {
                None => true,
                Some(hw) if t.timestamp > hw => true,
                Some(hw) if t.timestamp == hw => !self.boundary.contains(&trade_key(t)),
                Some(_) => false,
            })
            .collect();

        for trade in &fresh {
            match self.high_water {
                Some(hw) if trade.timestamp < hw => {}
                Some(hw) if trade.timestamp == hw => {
                    self.boundary.insert(trade_key(trade));
                }
                _ => {
                    self.high_water = Some(trade.timestamp);
                    self.boundary.clear();
                    self.boundary.insert(trade_key(trade));
                }
            }
        }

        fresh
    }
}

fn trade_key(trade: &TradeEvent) -> String {
    match trade.tx_hash() {
        Some(tx) => format!("{tx}:{}:{}", trade.condition_id, trade.outcome_index),
        None => format!(
            "{}:{}:{}:{}:{:?}",
            trade.condition_id, trade.outcome_index, trade.wallet, trade.price, trade.size
        ),
    }
}

/// Convert a raw page, dropping records that fail to parse.
pub fn convert_trades(raw: Vec<ApiTrade>) -> Vec<TradeEvent> {
    raw.into_iter()
        .filter_map(|t| match TradeEvent::try_from(t) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed trade");
                counter!("events_skipped_total").increment(1);
                None
            }
        })
        .collect()
}

/// Poll the Data API for recent trades and forward new ones to the pipeline.
///
/// Flow:
/// 1. Prime the cursor with the first page so startup does not replay history
/// 2. Every `interval_secs`, fetch the latest `limit` trades
/// 3. Forward trades past the cursor, oldest first, via `trade_tx`
pub async fn run_trade_poller(
    data_client: DataClient,
    trade_tx: mpsc::Sender<TradeEvent>,
    interval_secs: u64,
    limit: u32,
) {
    tracing::info!(interval_secs, limit, "Trade poller started");

    let mut cursor = TradeCursor::new();

    match data_client.get_recent_trades(limit).await {
        Ok(raw) => {
            let primed = cursor.advance(convert_trades(raw));
            tracing::info!(
                trades = primed.len(),
                high_water = ?cursor.high_water(),
                "Trade cursor primed"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Trade poller: initial fetch failed"),
    }

    loop {
        sleep(Duration::from_secs(interval_secs)).await;

        let raw = match data_client.get_recent_trades(limit).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "Trade poller: failed to fetch trades");
                continue;
            }
        };

        let fresh = cursor.advance(convert_trades(raw));
        if fresh.is_empty() {
            continue;
        }

        tracing::debug!(new_trades = fresh.len(), "Trade poller cycle");

        for event in fresh {
            if trade_tx.send(event).await.is_err() {
                tracing::error!("Trade channel closed, stopping poller");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(tx: &str, ts: f64) -> TradeEvent {
        TradeEvent {
            condition_id: "0xcond".into(),
            market_title: String::new(),
            market_slug: String::new(),
            outcome_name: "Yes".into(),
            outcome_index: 0,
            price: 0.5,
            size: Some(1.0),
            wallet: "0xw".into(),
            transaction_hash: Some(tx.into()),
            timestamp: ts,
        }
    }

    fn hashes(trades: &[TradeEvent]) -> Vec<&str> {
        trades.iter().filter_map(|t| t.tx_hash()).collect()
    }

    #[test]
    fn test_first_batch_sorted_oldest_first() {
        let mut cursor = TradeCursor::new();
        let fresh = cursor.advance(vec![trade("c", 3.0), trade("a", 1.0), trade("b", 2.0)]);
        assert_eq!(hashes(&fresh), vec!["a", "b", "c"]);
        assert_eq!(cursor.high_water(), Some(3.0));
    }

    #[test]
    fn test_overlapping_page_only_forwards_new() {
        let mut cursor = TradeCursor::new();
        cursor.advance(vec![trade("a", 1.0), trade("b", 2.0)]);

        let fresh = cursor.advance(vec![trade("b", 2.0), trade("c", 2.0), trade("d", 4.0), trade("a", 1.0)]);
        assert_eq!(hashes(&fresh), vec!["c", "d"]);
        assert_eq!(cursor.high_water(), Some(4.0));
    }

    #[test]
    fn test_repeated_page_forwards_nothing() {
        let mut cursor = TradeCursor::new();
        let page = vec![trade("a", 5.0), trade("b", 5.0)];
        cursor.advance(page.clone());
        assert!(cursor.advance(page).is_empty());
    }

    #[test]
    fn test_convert_skips_malformed() {
        let good: ApiTrade = serde_json::from_str(
            r#"{"conditionId":"0x1","price":0.5,"timestamp":10,"outcomeIndex":0}"#,
        )
        .unwrap();
        let bad: ApiTrade = serde_json::from_str(r#"{"conditionId":"0x1"}"#).unwrap();

        let events = convert_trades(vec![good, bad]);
        assert_eq!(events.len(), 1);
    }
}
