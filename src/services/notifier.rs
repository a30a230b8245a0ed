use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::models::{Alert, AlertPayload, PriceMoveAlert, WhaleAlert};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(15);
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const MARKET_URL_BASE: &str = "https://polymarket.com/event";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("non-success status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// An alert rendered once for every sink: chat text plus structured payload.
#[derive(Debug, Clone)]
pub struct RenderedAlert {
    pub alert: Alert,
    pub text: String,
    pub payload: AlertPayload,
}

impl RenderedAlert {
    pub fn new(alert: Alert) -> Self {
        let text = format_alert(&alert);
        let payload = alert.payload();
        Self {
            alert,
            text,
            payload,
        }
    }
}

/// A destination for alerts. Implementations report failure; they never retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short identifier used in logs and metric labels.
    fn name(&self) -> &str;

    /// Upper bound on a single delivery.
    fn timeout(&self) -> Duration {
        WEBHOOK_TIMEOUT
    }

    async fn send(&self, alert: &RenderedAlert) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

/// Telegram chat sink. Sends the human-readable text.
#[derive(Debug, Clone)]
pub struct TelegramSink {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE.into(), bot_token, chat_id)
    }

    pub fn with_base_url(base_url: String, bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            bot_token,
            chat_id,
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn timeout(&self) -> Duration {
        TELEGRAM_TIMEOUT
    }

    async fn send(&self, alert: &RenderedAlert) -> Result<(), SinkError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);

        let body = json!({
            "chat_id": self.chat_id,
            "text": alert.text,
            "disable_web_page_preview": true,
        });

        let resp = self.http.post(&url).json(&body).send().await?;
        check_status(resp).await
    }
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// Posts the structured payload as JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &RenderedAlert) -> Result<(), SinkError> {
        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&alert.payload)
            .send()
            .await?;
        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<(), SinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SinkError::Status {
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Dashboard broadcast
// ---------------------------------------------------------------------------

/// Fans alerts out to connected dashboard WebSocket clients.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<WsMessage>,
}

impl BroadcastSink {
    pub fn new(tx: broadcast::Sender<WsMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationSink for BroadcastSink {
    fn name(&self) -> &str {
        "dashboard"
    }

    async fn send(&self, alert: &RenderedAlert) -> Result<(), SinkError> {
        let msg = WsMessage::Alert {
            severity: alert.alert.severity(),
            payload: alert.payload.clone(),
        };
        // No connected clients is fine
        let _ = self.tx.send(msg);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn format_alert(alert: &Alert) -> String {
    match alert {
        Alert::Whale(a) => format_whale_alert(a),
        Alert::PriceMove(a) => format_price_move_alert(a),
    }
}

/// Format a whale trade notification.
pub fn format_whale_alert(alert: &WhaleAlert) -> String {
    let mut size = format!("Size: >= ${}", format_usd(alert.threshold_usd));
    if alert.size_known {
        size.push_str(&format!(" (≈ ${})", format_usd(alert.size_usd)));
    }

    format_block(
        "🐳",
        "WHALE TRADE",
        &[
            format!("Market: {}", alert.market_title),
            format!("Outcome: {} @ {:.3}", alert.outcome_name, alert.price),
            size,
            format!("Trader: {}", alert.wallet),
            format!("Link: {}", market_link(&alert.market_slug)),
        ],
    )
}

/// Format a price squeeze notification.
pub fn format_price_move_alert(alert: &PriceMoveAlert) -> String {
    format_block(
        "📊",
        &format!("PRICE MOVE {}", alert.direction),
        &[
            format!("Market: {}", alert.market_title),
            format!("Outcome: {}", alert.outcome_name),
            format!(
                "Move: {:.2}% in ~{}s ({:.3} → {:.3})",
                alert.percent_change, alert.duration_sec, alert.price_old, alert.price_new
            ),
            format!("Link: {}", market_link(&alert.market_slug)),
        ],
    )
}

fn format_block(icon: &str, title: &str, lines: &[String]) -> String {
    let mut out = format!("{icon} {title}");
    for line in lines {
        out.push('\n');
        out.push_str(line);
    }
    out
}

pub fn market_link(slug: &str) -> String {
    format!("{MARKET_URL_BASE}/{slug}")
}

/// Whole dollars with thousands separators: `12345.6` → `12,346`.
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
