pub mod binance;
pub mod ipify;

use crate::error::FetchError;
use crate::models::{CandleSeries, Granularity};
use async_trait::async_trait;

pub use binance::BinanceClient;
pub use ipify::fetch_public_ip;

/// Abstract interface for fetching market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the most recent `limit` candles for a symbol, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        granularity: Granularity,
        limit: usize,
    ) -> Result<CandleSeries, FetchError>;
}
