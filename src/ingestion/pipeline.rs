use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::sync::mpsc;

use crate::detection::{MarketResolver, SqueezeConfig, SqueezeDetector, WhaleConfig, WhaleDetector};
use crate::models::{Alert, TradeEvent};
use crate::services::dispatcher::AlertDispatcher;

/// Both detectors plus the resolver they share. Owned by a single task so
/// events for a key are always evaluated in feed order.
pub struct AlertPipeline {
    whale: WhaleDetector,
    squeeze: SqueezeDetector,
    resolver: Arc<dyn MarketResolver>,
}

impl AlertPipeline {
    pub fn new(
        whale: WhaleConfig,
        squeeze: SqueezeConfig,
        resolver: Arc<dyn MarketResolver>,
    ) -> Self {
        Self {
            whale: WhaleDetector::new(whale),
            squeeze: SqueezeDetector::new(squeeze),
            resolver,
        }
    }

    pub fn whale(&self) -> &WhaleDetector {
        &self.whale
    }

    pub fn squeeze(&self) -> &SqueezeDetector {
        &self.squeeze
    }

    /// Run one event through both detectors. Whale alert first, then squeeze.
    pub fn process_trade_event(&mut self, event: &TradeEvent) -> Vec<Alert> {
        counter!("trade_events_total").increment(1);

        let resolver = self.resolver.as_ref();
        let mut alerts = Vec::with_capacity(2);

        if let Some(alert) = self.whale.evaluate(event, resolver) {
            tracing::info!(
                market = %alert.market_title(),
                wallet = %event.wallet,
                notional = ?event.notional(),
                "Whale trade detected"
            );
            counter!("whale_alerts_total").increment(1);
            alerts.push(alert);
        }

        if let Some(alert) = self.squeeze.evaluate(event, resolver) {
            counter!("price_move_alerts_total").increment(1);
            alerts.push(alert);
        }

        alerts
    }
}

/// Consume trade events sequentially and hand alerts to the dispatcher
/// without waiting on delivery.
pub async fn run_pipeline(
    mut rx: mpsc::Receiver<TradeEvent>,
    mut pipeline: AlertPipeline,
    dispatcher: AlertDispatcher,
) {
    tracing::info!(sinks = ?dispatcher.sink_names(), "Alert pipeline started");

    while let Some(event) = rx.recv().await {
        let start = Instant::now();

        for alert in pipeline.process_trade_event(&event) {
            dispatcher.dispatch(alert);
        }

        histogram!("pipeline_latency_seconds").record(start.elapsed().as_secs_f64());
    }

    tracing::warn!("TradeEvent channel closed");
}
