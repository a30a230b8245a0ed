use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::MarketMeta;

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

#[derive(Debug, Error)]
pub enum GammaClientError {
    #[error("market listing request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GammaEvent {
    #[serde(default)]
    pub slug: Option<String>,
}

/// One entry of the Gamma `/markets` listing. Only the fields alerts need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    pub condition_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub events: Vec<GammaEvent>,
    /// Stringified JSON array of outcome labels, e.g. "[\"Yes\",\"No\"]"
    #[serde(default)]
    pub outcomes: Option<String>,
}

impl GammaMarket {
    /// Parse the stringified outcomes array. Empty on malformed input.
    pub fn parse_outcomes(&self) -> Vec<String> {
        self.outcomes
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .unwrap_or_default()
    }

    /// Slug used in polymarket.com/event/{slug} links: the parent event's
    /// slug when there is one, else the market's own.
    pub fn event_slug(&self) -> Option<&str> {
        self.events
            .iter()
            .find_map(|e| e.slug.as_deref())
            .or(self.slug.as_deref())
    }

    pub fn to_meta(&self) -> MarketMeta {
        MarketMeta {
            title: self.question.clone(),
            slug: self.event_slug().unwrap_or_default().to_string(),
            outcomes: self.parse_outcomes(),
        }
    }
}

/// Read-only client for the public market listing.
#[derive(Debug, Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

impl Default for GammaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaClient {
    pub fn new() -> Self {
        Self::with_base_url(GAMMA_API_BASE.into())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// One page of open markets, `page_size` entries starting at `offset`.
    pub async fn market_page(
        &self,
        page_size: u32,
        offset: u32,
    ) -> Result<Vec<GammaMarket>, GammaClientError> {
        let markets = self
            .http
            .get(format!("{}/markets", self.base_url))
            .query(&[("active", "true"), ("closed", "false")])
            .query(&[("limit", page_size), ("offset", offset)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<GammaMarket>>()
            .await?;

        tracing::debug!(offset, count = markets.len(), "Fetched market page");
        Ok(markets)
    }
}
