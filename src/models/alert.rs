use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_change(pct: f64) -> Self {
        if pct > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

const HIGH_WHALE_USD: f64 = 200_000.0;
const LOW_WHALE_USD: f64 = 150_000.0;
const HIGH_MOVE_PCT: f64 = 20.0;

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct WhaleAlert {
    pub market_title: String,
    pub market_slug: String,
    pub outcome_name: String,
    pub price: f64,
    pub size_usd: f64,
    /// Shortened wallet, e.g. `0x1234…abcd`.
    pub wallet: String,
    pub timestamp: i64,
    /// Size filter the trade passed; shown as the floor in text messages.
    pub threshold_usd: f64,
    /// False when `size_usd` fell back to the threshold.
    pub size_known: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceMoveAlert {
    pub market_title: String,
    pub market_slug: String,
    pub outcome_name: String,
    pub price_old: f64,
    pub price_new: f64,
    /// Percent, not fraction: a move from 0.10 to 0.16 is `60.0`.
    pub percent_change: f64,
    pub duration_sec: i64,
    pub direction: Direction,
    pub timestamp: i64,
}

/// Detector output, independent of any sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Whale(WhaleAlert),
    PriceMove(PriceMoveAlert),
}

impl Alert {
    pub fn kind(&self) -> &'static str {
        match self {
            Alert::Whale(_) => "whale",
            Alert::PriceMove(_) => "price_move",
        }
    }

    pub fn market_title(&self) -> &str {
        match self {
            Alert::Whale(a) => &a.market_title,
            Alert::PriceMove(a) => &a.market_title,
        }
    }

    pub fn market_slug(&self) -> &str {
        match self {
            Alert::Whale(a) => &a.market_slug,
            Alert::PriceMove(a) => &a.market_slug,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Alert::Whale(a) => a.timestamp,
            Alert::PriceMove(a) => a.timestamp,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Alert::Whale(a) if a.size_usd >= HIGH_WHALE_USD => Severity::High,
            Alert::Whale(a) if a.size_usd < LOW_WHALE_USD => Severity::Low,
            Alert::Whale(_) => Severity::Medium,
            Alert::PriceMove(a) if a.percent_change.abs() >= HIGH_MOVE_PCT => Severity::High,
            Alert::PriceMove(_) => Severity::Medium,
        }
    }

    /// Structured form posted to webhooks and dashboard clients.
    pub fn payload(&self) -> AlertPayload {
        match self {
            Alert::Whale(a) => AlertPayload::Whale {
                market_title: a.market_title.clone(),
                market_slug: a.market_slug.clone(),
                outcome: a.outcome_name.clone(),
                price: a.price,
                size_usd: a.size_usd,
                wallet: a.wallet.clone(),
                timestamp: a.timestamp,
            },
            Alert::PriceMove(a) => AlertPayload::PriceMove {
                market_title: a.market_title.clone(),
                market_slug: a.market_slug.clone(),
                outcome: a.outcome_name.clone(),
                price_old: a.price_old,
                price_new: a.price_new,
                percent_change: a.percent_change,
                duration_sec: a.duration_sec,
                direction: a.direction,
                timestamp: a.timestamp,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Webhook payload. Field names and types are a fixed wire contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlertPayload {
    #[serde(rename = "whale")]
    Whale {
        market_title: String,
        market_slug: String,
        outcome: String,
        price: f64,
        size_usd: f64,
        wallet: String,
        timestamp: i64,
    },

    #[serde(rename = "price_move")]
    PriceMove {
        market_title: String,
        market_slug: String,
        outcome: String,
        price_old: f64,
        price_new: f64,
        percent_change: f64,
        duration_sec: i64,
        direction: Direction,
        timestamp: i64,
    },
}
