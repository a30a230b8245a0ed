pub mod pipeline;
pub mod trade_poller;
