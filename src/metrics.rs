use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("trade_events_total").absolute(0);
    counter!("events_skipped_total").absolute(0);
    counter!("whale_alerts_total").absolute(0);
    counter!("whale_duplicates_total").absolute(0);
    counter!("unresolved_markets_total").absolute(0);
    counter!("price_move_alerts_total").absolute(0);

    gauge!("markets_known").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("pipeline_latency_seconds").record(0.0);

    Ok(handle)
}
