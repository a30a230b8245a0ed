pub mod alert_log;
pub mod dispatcher;
pub mod market_catalog;
pub mod notifier;
