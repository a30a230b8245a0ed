use std::sync::Arc;

use metrics::counter;
use tokio::task::{JoinHandle, JoinSet};

use crate::models::Alert;

use super::alert_log::AlertLog;
use super::notifier::{NotificationSink, RenderedAlert, SinkError};

/// Outcome of delivering one alert to every sink.
#[derive(Debug, Default, Clone)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    /// `(sink name, error detail)` per failed sink.
    pub failed: Vec<(String, String)>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Turns detector output into rendered alerts and fans them out to sinks.
///
/// Sinks are independent: a failure, timeout or panic in one is logged and
/// never affects the others or the caller.
#[derive(Clone)]
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn NotificationSink>>,
    log: Option<Arc<AlertLog>>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks, log: None }
    }

    /// Also record every dispatched alert in `log`.
    pub fn with_log(mut self, log: Arc<AlertLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name().to_string()).collect()
    }

    /// Fire-and-forget delivery. Returns immediately; the handle may be
    /// awaited for the report but callers in the hot path drop it.
    pub fn dispatch(&self, alert: Alert) -> JoinHandle<DeliveryReport> {
        let rendered = Arc::new(RenderedAlert::new(alert));
        if let Some(log) = &self.log {
            log.record(rendered.alert.clone());
        }

        let this = self.clone();
        tokio::spawn(async move { this.deliver(rendered).await })
    }

    /// Deliver to all sinks concurrently and wait for every one to finish or
    /// time out.
    pub async fn deliver(&self, rendered: Arc<RenderedAlert>) -> DeliveryReport {
        let mut set = JoinSet::new();
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let rendered = Arc::clone(&rendered);
            set.spawn(async move {
                let name = sink.name().to_string();
                let result = send_with_timeout(sink.as_ref(), &rendered).await;
                (name, result)
            });
        }

        let mut report = DeliveryReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    tracing::debug!(sink = %name, kind = rendered.alert.kind(), "Alert delivered");
                    counter!("alerts_delivered_total", "sink" => name.clone()).increment(1);
                    report.delivered.push(name);
                }
                Ok((name, Err(e))) => {
                    tracing::warn!(
                        sink = %name,
                        error = %e,
                        kind = rendered.alert.kind(),
                        market = %rendered.alert.market_title(),
                        "Alert delivery failed"
                    );
                    counter!("sink_failures_total", "sink" => name.clone()).increment(1);
                    report.failed.push((name, e.to_string()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Sink task aborted");
                    counter!("sink_failures_total", "sink" => "unknown").increment(1);
                    report.failed.push(("unknown".into(), e.to_string()));
                }
            }
        }

        report
    }
}

async fn send_with_timeout(
    sink: &dyn NotificationSink,
    rendered: &RenderedAlert,
) -> Result<(), SinkError> {
    let limit = sink.timeout();
    match tokio::time::timeout(limit, sink.send(rendered)).await {
        Ok(result) => result,
        Err(_) => Err(SinkError::Timeout(limit)),
    }
}
