use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use polyalarm::detection::{MarketResolver, SqueezeConfig, WhaleConfig};
use polyalarm::ingestion::pipeline::AlertPipeline;
use polyalarm::models::{MarketMeta, TradeEvent};
use polyalarm::services::market_catalog::MarketCatalog;
use polyalarm::services::notifier::{NotificationSink, RenderedAlert, SinkError};

pub const MARKET_ID: &str = "0xc0ffee00000000000000000000000000000000000000000000000000000000aa";

/// Catalog pre-loaded with one binary market.
#[allow(dead_code)]
pub fn test_catalog() -> Arc<MarketCatalog> {
    let catalog = MarketCatalog::new();
    catalog.insert(
        MARKET_ID,
        MarketMeta {
            title: "Will the Fed cut rates in March?".into(),
            slug: "fed-march-cut".into(),
            outcomes: vec!["Yes".into(), "No".into()],
        },
    );
    Arc::new(catalog)
}

#[allow(dead_code)]
pub fn test_pipeline() -> AlertPipeline {
    let resolver: Arc<dyn MarketResolver> = test_catalog();
    AlertPipeline::new(
        WhaleConfig {
            threshold_usd: 1_000.0,
            cooldown_sec: 300.0,
            dedup_capacity: 10_000,
        },
        SqueezeConfig {
            window_sec: 60.0,
            pct_threshold: 0.05,
            cooldown_sec: 300.0,
        },
        resolver,
    )
}

/// A trade on the test market. Size 1 keeps it below the whale threshold.
#[allow(dead_code)]
pub fn make_trade(outcome_index: u32, price: f64, ts: f64) -> TradeEvent {
    TradeEvent {
        condition_id: MARKET_ID.into(),
        market_title: "Will the Fed cut rates in March?".into(),
        market_slug: "fed-march-cut".into(),
        outcome_name: if outcome_index == 0 { "Yes".into() } else { "No".into() },
        outcome_index,
        price,
        size: Some(1.0),
        wallet: "0x9d84ce0306f8551e02efef1680475fc0f1dc1344".into(),
        transaction_hash: None,
        timestamp: ts,
    }
}

#[allow(dead_code)]
pub fn make_whale_trade(tx: &str, size: f64, price: f64, ts: f64) -> TradeEvent {
    TradeEvent {
        size: Some(size),
        transaction_hash: Some(tx.into()),
        ..make_trade(0, price, ts)
    }
}

/// Sink behaviour for dispatcher tests.
#[allow(dead_code)]
pub enum Behaviour {
    Succeed,
    Fail,
    Hang,
}

/// In-memory sink that records what it was asked to send.
#[allow(dead_code)]
pub struct RecordingSink {
    pub name: String,
    pub behaviour: Behaviour,
    pub timeout: Duration,
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new(name: &str, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            behaviour,
            timeout: Duration::from_millis(200),
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, alert: &RenderedAlert) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => {
                self.texts.lock().unwrap().push(alert.text.clone());
                Ok(())
            }
            Behaviour::Fail => Err(SinkError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}
