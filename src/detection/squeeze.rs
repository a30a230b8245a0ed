use std::collections::{HashMap, VecDeque};

use crate::models::{Alert, Direction, MarketInfo, PriceMoveAlert, TradeEvent};

use super::{epoch_secs, MarketResolver};

/// Squeeze detection parameters.
#[derive(Debug, Clone)]
pub struct SqueezeConfig {
    /// Width of the sliding price window, in seconds.
    pub window_sec: f64,
    /// Minimum absolute move as a fraction, e.g. `0.05` for 5%.
    pub pct_threshold: f64,
    /// Per (market, outcome) quiet period after an alert, in seconds.
    pub cooldown_sec: f64,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            window_sec: 60.0,
            pct_threshold: 0.05,
            cooldown_sec: 300.0,
        }
    }
}

type Key = (String, u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub ts: f64,
    pub price: f64,
}

/// Tracks a sliding window of prices per (condition id, outcome index) and
/// alerts when the newest price has moved far enough from the oldest one.
pub struct SqueezeDetector {
    config: SqueezeConfig,
    windows: HashMap<Key, VecDeque<PricePoint>>,
    cooldown_until: HashMap<Key, f64>,
}

impl SqueezeDetector {
    pub fn new(config: SqueezeConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
            cooldown_until: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SqueezeConfig {
        &self.config
    }

    /// Points currently retained for a key, oldest first.
    pub fn window(&self, condition_id: &str, outcome_index: u32) -> Vec<PricePoint> {
        self.windows
            .get(&(condition_id.to_string(), outcome_index))
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn cooldown_until(&self, condition_id: &str, outcome_index: u32) -> Option<f64> {
        self.cooldown_until
            .get(&(condition_id.to_string(), outcome_index))
            .copied()
    }

    pub fn evaluate(&mut self, trade: &TradeEvent, resolver: &dyn MarketResolver) -> Option<Alert> {
        let meta = resolver.resolve(&trade.condition_id)?;
        if !trade.price.is_finite() || trade.price <= 0.0 {
            return None;
        }
        let info = MarketInfo::for_trade(meta, trade);

        let key: Key = (info.condition_id.clone(), info.outcome_index);
        let window = self.windows.entry(key.clone()).or_default();
        window.push_back(PricePoint {
            ts: trade.timestamp,
            price: trade.price,
        });

        let cutoff = trade.timestamp - self.config.window_sec;
        while window.front().is_some_and(|p| p.ts < cutoff) {
            window.pop_front();
        }

        if window.len() < 2 {
            return None;
        }

        let cooldown = self.cooldown_until.get(&key).copied().unwrap_or(0.0);
        if trade.timestamp < cooldown {
            return None;
        }

        let (old, new) = match (window.front(), window.back()) {
            (Some(old), Some(new)) => (*old, *new),
            _ => return None,
        };
        if old.price <= 0.0 {
            return None;
        }

        let pct = (new.price - old.price) / old.price;
        if pct.abs() < self.config.pct_threshold {
            return None;
        }

        let direction = Direction::from_change(pct);
        let duration_sec = (new.ts - old.ts).trunc() as i64;

        tracing::info!(
            condition_id = %info.condition_id,
            outcome = %info.outcome_name,
            direction = %direction,
            pct = pct * 100.0,
            duration_sec,
            "Price squeeze detected"
        );

        self.cooldown_until
            .insert(key, trade.timestamp + self.config.cooldown_sec);

        Some(Alert::PriceMove(PriceMoveAlert {
            market_title: info.title,
            market_slug: info.slug,
            outcome_name: info.outcome_name,
            price_old: old.price,
            price_new: new.price,
            percent_change: pct * 100.0,
            duration_sec,
            direction,
            timestamp: epoch_secs(trade.timestamp),
        }))
    }
}
