pub mod client;
pub mod endpoints;
pub mod models;

pub use client::{ApiCall, ApiClient};
pub use endpoints::CryptoListSource;
pub use models::{CoinDetail, CoinLink, CryptoSummary, MarketData};
