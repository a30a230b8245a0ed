use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::detection::{SqueezeConfig, WhaleConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,

    // Sinks (optional: a sink is enabled only when fully configured)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub alert_webhook_url: Option<String>,

    // Whale detection
    pub whale_usd: f64,
    pub whale_cooldown_sec: f64,
    pub whale_dedup_capacity: usize,

    // Squeeze detection
    pub squeeze_window_sec: f64,
    pub squeeze_pct: f64,
    pub squeeze_cooldown_sec: f64,

    // Feed
    pub trade_poll_interval_secs: u64,
    pub trade_poll_limit: u32,
    pub market_refresh_secs: u64,
    pub market_pages: u32,
    pub market_page_size: u32,

    // API
    pub alert_log_capacity: usize,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults;
    /// set-but-unparseable numbers are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "PORT", 8080)?,
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            alert_webhook_url: get("ALERT_WEBHOOK_URL"),

            whale_usd: parse_or(&get, "WHALE_USD", 10_000.0)?,
            whale_cooldown_sec: parse_or(&get, "WHALE_COOLDOWN_SEC", 600.0)?,
            whale_dedup_capacity: parse_or(&get, "WHALE_DEDUP_CAPACITY", 50_000)?,

            squeeze_window_sec: parse_or(&get, "SQUEEZE_WINDOW_SEC", 60.0)?,
            squeeze_pct: parse_or(&get, "SQUEEZE_PCT", 0.05)?,
            squeeze_cooldown_sec: parse_or(&get, "SQUEEZE_COOLDOWN_SEC", 300.0)?,

            trade_poll_interval_secs: parse_or(&get, "TRADE_POLL_INTERVAL_SECS", 5)?,
            trade_poll_limit: parse_or(&get, "TRADE_POLL_LIMIT", 500)?,
            market_refresh_secs: parse_or(&get, "MARKET_REFRESH_SECS", 300)?,
            market_pages: parse_or(&get, "MARKET_PAGES", 10)?,
            market_page_size: parse_or(&get, "MARKET_PAGE_SIZE", 500)?,

            alert_log_capacity: parse_or(&get, "ALERT_LOG_CAPACITY", 500)?,
            api_token: get("API_TOKEN"),
        };

        for (key, value) in [
            ("SQUEEZE_WINDOW_SEC", config.squeeze_window_sec),
            ("SQUEEZE_PCT", config.squeeze_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("{key}={value} must be a finite positive number");
            }
        }
        for (key, value) in [
            ("WHALE_USD", config.whale_usd),
            ("WHALE_COOLDOWN_SEC", config.whale_cooldown_sec),
            ("SQUEEZE_COOLDOWN_SEC", config.squeeze_cooldown_sec),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                anyhow::bail!("{key}={value} must be a finite non-negative number");
            }
        }

        Ok(config)
    }

    /// Returns the Telegram credentials if both are configured.
    pub fn telegram(&self) -> Option<(String, String)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) => Some((token.clone(), chat.clone())),
            _ => None,
        }
    }

    pub fn whale_config(&self) -> WhaleConfig {
        WhaleConfig {
            threshold_usd: self.whale_usd,
            cooldown_sec: self.whale_cooldown_sec,
            dedup_capacity: self.whale_dedup_capacity,
        }
    }

    pub fn squeeze_config(&self) -> SqueezeConfig {
        SqueezeConfig {
            window_sec: self.squeeze_window_sec,
            pct_threshold: self.squeeze_pct,
            cooldown_sec: self.squeeze_cooldown_sec,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}
