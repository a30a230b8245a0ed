pub mod alert;
pub mod market;
pub mod trade;

pub use alert::{Alert, AlertPayload, Direction, PriceMoveAlert, Severity, WhaleAlert};
pub use market::{MarketInfo, MarketMeta};
pub use trade::TradeEvent;
