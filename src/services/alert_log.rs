use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Alert, Severity};

use super::notifier::format_usd;

/// In-memory ring of the most recent alerts, newest last. Lost on restart.
pub struct AlertLog {
    capacity: usize,
    inner: Mutex<LogInner>,
}

struct LogInner {
    next_id: u64,
    entries: VecDeque<LoggedAlert>,
}

#[derive(Debug, Clone)]
pub struct LoggedAlert {
    pub id: u64,
    pub alert: Alert,
}

/// Dashboard view of a logged alert.
#[derive(Debug, Clone, Serialize)]
pub struct RecentAlert {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub icon: &'static str,
    pub market_slug: String,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(LogInner {
                next_id: 1,
                entries: VecDeque::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, alert: Alert) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_back(LoggedAlert { id, alert });
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
        }
        id
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `limit` alerts, newest first. `kind` filters by alert type;
    /// `None` or `"all"` returns every type.
    pub fn recent(&self, limit: usize, kind: Option<&str>) -> Vec<RecentAlert> {
        let kind = kind.filter(|k| *k != "all");
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .entries
            .iter()
            .rev()
            .filter(|e| kind.map_or(true, |k| e.alert.kind() == k))
            .take(limit)
            .map(to_recent)
            .collect()
    }
}

fn to_recent(entry: &LoggedAlert) -> RecentAlert {
    let alert = &entry.alert;
    let (title, description, icon) = match alert {
        Alert::Whale(a) => (
            "WHALE ALERT".to_string(),
            format!(
                "{} - {} @ {:.3} (≈ ${}) {}",
                a.market_title,
                a.outcome_name,
                a.price,
                format_usd(a.size_usd),
                a.wallet
            ),
            "🐋",
        ),
        Alert::PriceMove(a) => (
            format!("PRICE MOVE {}", a.direction),
            format!(
                "{} - {}: {:.3} → {:.3} ({}{:.1}% in {}s)",
                a.market_title,
                a.outcome_name,
                a.price_old,
                a.price_new,
                if a.percent_change >= 0.0 { "+" } else { "" },
                a.percent_change,
                a.duration_sec
            ),
            "📊",
        ),
    };

    RecentAlert {
        id: entry.id,
        kind: alert.kind(),
        severity: alert.severity(),
        title,
        description,
        timestamp: DateTime::from_timestamp(alert.timestamp(), 0),
        icon,
        market_slug: alert.market_slug().to_string(),
    }
}
