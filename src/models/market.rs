use serde::{Deserialize, Serialize};

use super::TradeEvent;

/// Market metadata as known to a resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMeta {
    pub title: String,
    pub slug: String,
    /// Outcome labels ordered by outcome index, e.g. `["Yes", "No"]`.
    #[serde(default)]
    pub outcomes: Vec<String>,
}

/// Resolved view of the market a trade belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketInfo {
    pub condition_id: String,
    pub title: String,
    pub slug: String,
    pub outcome_name: String,
    pub outcome_index: u32,
}

impl MarketInfo {
    /// Combine resolver metadata with the trade. The outcome label comes from
    /// the catalog when it knows the index, else from the trade itself.
    pub fn for_trade(meta: MarketMeta, trade: &TradeEvent) -> Self {
        let outcome_name = meta
            .outcomes
            .get(trade.outcome_index as usize)
            .cloned()
            .unwrap_or_else(|| trade.outcome_name.clone());

        Self {
            condition_id: trade.condition_id.clone(),
            title: meta.title,
            slug: meta.slug,
            outcome_name,
            outcome_index: trade.outcome_index,
        }
    }
}
