use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::gauge;
use tokio::time::sleep;

use crate::detection::MarketResolver;
use crate::models::MarketMeta;
use crate::polymarket::gamma_client::{GammaClient, GammaClientError};

/// Condition id → market metadata, refreshed from the Gamma API.
#[derive(Default)]
pub struct MarketCatalog {
    markets: RwLock<HashMap<String, MarketMeta>>,
}

impl MarketCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, condition_id: impl Into<String>, meta: MarketMeta) {
        self.markets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(condition_id.into(), meta);
    }

    /// Swap in a fresh snapshot.
    pub fn replace(&self, markets: HashMap<String, MarketMeta>) {
        *self.markets.write().unwrap_or_else(|e| e.into_inner()) = markets;
    }

    pub fn len(&self) -> usize {
        self.markets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Page through active markets and replace the catalog. On error the
    /// previous contents are kept.
    pub async fn refresh(
        &self,
        gamma: &GammaClient,
        pages: u32,
        page_size: u32,
    ) -> Result<usize, GammaClientError> {
        let mut fresh = HashMap::new();

        for page in 0..pages {
            let batch = gamma.market_page(page_size, page * page_size).await?;
            let done = (batch.len() as u32) < page_size;
            for market in batch {
                fresh.insert(market.condition_id.clone(), market.to_meta());
            }
            if done {
                break;
            }
        }

        let count = fresh.len();
        self.replace(fresh);
        gauge!("markets_known").set(count as f64);
        Ok(count)
    }
}

impl MarketResolver for MarketCatalog {
    fn resolve(&self, condition_id: &str) -> Option<MarketMeta> {
        self.markets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(condition_id)
            .cloned()
    }
}

/// Refresh the catalog every `interval_secs`. Failures keep the last snapshot.
pub async fn run_catalog_refresher(
    catalog: Arc<MarketCatalog>,
    gamma: GammaClient,
    interval_secs: u64,
    pages: u32,
    page_size: u32,
) {
    tracing::info!(interval_secs, pages, "Market catalog refresher started");

    loop {
        sleep(Duration::from_secs(interval_secs)).await;

        match catalog.refresh(&gamma, pages, page_size).await {
            Ok(count) => tracing::debug!(markets = count, "Market catalog refreshed"),
            Err(e) => tracing::warn!(
                error = %e,
                markets = catalog.len(),
                "Market catalog refresh failed, keeping previous snapshot"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(title: &str) -> MarketMeta {
        MarketMeta {
            title: title.into(),
            slug: title.to_lowercase(),
            outcomes: vec!["Yes".into(), "No".into()],
        }
    }

    #[test]
    fn test_resolve_hit_and_miss() {
        let catalog = MarketCatalog::new();
        catalog.insert("0xaaa", meta("Alpha"));

        assert_eq!(catalog.resolve("0xaaa").map(|m| m.title), Some("Alpha".into()));
        assert!(catalog.resolve("0xbbb").is_none());
    }

    #[test]
    fn test_replace_drops_delisted_markets() {
        let catalog = MarketCatalog::new();
        catalog.insert("0xaaa", meta("Alpha"));

        let mut snapshot = HashMap::new();
        snapshot.insert("0xbbb".to_string(), meta("Beta"));
        catalog.replace(snapshot);

        assert!(catalog.resolve("0xaaa").is_none());
        assert!(catalog.resolve("0xbbb").is_some());
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_pages_until_short_batch() {
        let mut server = mockito::Server::new_async().await;

        let page0 = server
            .mock("GET", "/markets")
            .match_query(mockito::Matcher::UrlEncoded("offset".into(), "0".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"conditionId":"0x1","question":"One"},{"conditionId":"0x2","question":"Two"}]"#,
            )
            .create_async()
            .await;
        let page1 = server
            .mock("GET", "/markets")
            .match_query(mockito::Matcher::UrlEncoded("offset".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"conditionId":"0x3","question":"Three"}]"#)
            .create_async()
            .await;

        let gamma = GammaClient::with_base_url(server.url());
        let catalog = MarketCatalog::new();
        let count = catalog.refresh(&gamma, 5, 2).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(catalog.resolve("0x3").map(|m| m.title), Some("Three".into()));
        page0.assert_async().await;
        page1.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/markets")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let gamma = GammaClient::with_base_url(server.url());
        let catalog = MarketCatalog::new();
        catalog.insert("0xaaa", meta("Alpha"));

        assert!(catalog.refresh(&gamma, 1, 100).await.is_err());
        assert!(catalog.resolve("0xaaa").is_some());
    }
}
