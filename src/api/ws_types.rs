use serde::Serialize;

use crate::models::{AlertPayload, Severity};
use crate::services::alert_log::RecentAlert;

/// Messages pushed to dashboard WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// Sent once on connect: the newest logged alerts.
    #[serde(rename = "snapshot")]
    Snapshot { alerts: Vec<RecentAlert> },

    #[serde(rename = "alert")]
    Alert {
        severity: Severity,
        payload: AlertPayload,
    },
}
