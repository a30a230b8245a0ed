use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use polyalarm::api::router::create_router;
use polyalarm::api::ws_types::WsMessage;
use polyalarm::config::{AppConfig, LogFormat};
use polyalarm::ingestion::pipeline::{run_pipeline, AlertPipeline};
use polyalarm::ingestion::trade_poller::run_trade_poller;
use polyalarm::models::TradeEvent;
use polyalarm::polymarket::{DataClient, GammaClient};
use polyalarm::services::alert_log::AlertLog;
use polyalarm::services::dispatcher::AlertDispatcher;
use polyalarm::services::market_catalog::{run_catalog_refresher, MarketCatalog};
use polyalarm::services::notifier::{BroadcastSink, NotificationSink, TelegramSink, WebhookSink};
use polyalarm::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);
    let metrics_handle = polyalarm::metrics::init_metrics()?;

    let addr = format!("{}:{}", config.host, config.port);

    // --- Market catalog (resolver) ---
    let catalog = Arc::new(MarketCatalog::new());
    let gamma = GammaClient::new();
    match catalog
        .refresh(&gamma, config.market_pages, config.market_page_size)
        .await
    {
        Ok(count) => tracing::info!(markets = count, "Market catalog loaded"),
        Err(e) => tracing::warn!(error = %e, "Initial market catalog load failed, retrying on schedule"),
    }
    {
        let catalog = Arc::clone(&catalog);
        let (interval, pages, page_size) = (
            config.market_refresh_secs,
            config.market_pages,
            config.market_page_size,
        );
        tokio::spawn(async move {
            run_catalog_refresher(catalog, gamma, interval, pages, page_size).await;
        });
    }

    // --- Sinks ---
    let (ws_broadcast_tx, _) = broadcast::channel::<WsMessage>(256);
    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();

    if let Some((token, chat_id)) = config.telegram() {
        sinks.push(Arc::new(TelegramSink::new(token, chat_id)));
    } else {
        tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, Telegram alerts disabled");
    }
    if let Some(url) = config.alert_webhook_url.clone() {
        sinks.push(Arc::new(WebhookSink::new(url)));
    }
    sinks.push(Arc::new(BroadcastSink::new(ws_broadcast_tx.clone())));

    let alert_log = Arc::new(AlertLog::new(config.alert_log_capacity));
    let dispatcher = AlertDispatcher::new(sinks).with_log(Arc::clone(&alert_log));

    // --- Data pipeline: poller → detectors → dispatcher ---
    let (trade_tx, trade_rx) = mpsc::channel::<TradeEvent>(1000);

    let data_client = DataClient::new(reqwest::Client::new());
    let (poll_interval, poll_limit) = (config.trade_poll_interval_secs, config.trade_poll_limit);
    tokio::spawn(async move {
        run_trade_poller(data_client, trade_tx, poll_interval, poll_limit).await;
    });

    let pipeline = AlertPipeline::new(
        config.whale_config(),
        config.squeeze_config(),
        catalog.clone(),
    );
    tracing::info!(
        whale_usd = config.whale_usd,
        squeeze_window_sec = config.squeeze_window_sec,
        squeeze_pct = config.squeeze_pct,
        "Detectors configured"
    );
    tokio::spawn(async move {
        run_pipeline(trade_rx, pipeline, dispatcher).await;
    });

    // --- HTTP API ---
    let state = AppState {
        config,
        ws_tx: ws_broadcast_tx,
        metrics_handle,
        alert_log,
        catalog,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}
