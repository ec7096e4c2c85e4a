use super::MarketDataProvider;
use crate::error::FetchError;
use crate::models::{Candle, CandleSeries, Granularity};
use async_trait::async_trait;
use chrono::DateTime;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub const BINANCE_FUTURES_API_BASE: &str = "https://fapi.binance.com";
const KLINES_PATH: &str = "/fapi/v1/klines";
/// Largest `limit` the klines endpoint accepts
pub const MAX_KLINES_LIMIT: usize = 1500;
pub const DEFAULT_RATE_LIMIT_RPM: u32 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Type alias for the rate limiter to simplify signatures
type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for the Binance USDⓈ-M futures kline endpoint
///
/// Cloneable; all clones share the same rate limiter. Requests are paced by
/// the limiter but never retried: a failed request is reported once.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<BinanceRateLimiter>,
}

/// Error body returned by Binance, e.g. `{"code":-1121,"msg":"Invalid symbol."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

impl BinanceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        requests_per_minute: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        let quota = Quota::per_minute(
            NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Client against the public futures API with default limits
    pub fn public() -> Result<Self, FetchError> {
        Self::new(
            BINANCE_FUTURES_API_BASE,
            None,
            DEFAULT_RATE_LIMIT_RPM,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request_klines(
        &self,
        symbol: &str,
        granularity: Granularity,
        limit: usize,
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, KLINES_PATH);

        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let mut request = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("interval", granularity.as_str())])
            .query(&[("limit", limit)]);

        if let Some(api_key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        // 418 is Binance's ban after repeated 429s
        if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
            return Err(FetchError::RateLimited {
                status: status.as_u16(),
            });
        }

        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => Err(FetchError::Api {
                code: err.code,
                msg: err.msg,
            }),
            Err(_) => Err(FetchError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn get_candles(
        &self,
        symbol: &str,
        granularity: Granularity,
        limit: usize,
    ) -> Result<CandleSeries, FetchError> {
        let symbol = normalize_symbol(symbol)?;
        let limit = limit.clamp(1, MAX_KLINES_LIMIT);

        tracing::debug!(symbol = %symbol, "Fetching {} {} klines", limit, granularity);

        let body = self.request_klines(&symbol, granularity, limit).await?;
        let rows: Vec<Vec<Value>> = serde_json::from_str(&body)?;
        let row_count = rows.len();

        let candles = parse_kline_rows(&rows);

        if candles.len() < row_count {
            tracing::debug!(
                symbol = %symbol,
                "Dropped {} of {} kline rows with non-numeric prices",
                row_count - candles.len(),
                row_count
            );
        }

        if candles.is_empty() {
            return Err(FetchError::EmptySeries { symbol });
        }

        tracing::debug!(symbol = %symbol, "Fetched {} candles", candles.len());

        Ok(CandleSeries::new(symbol, granularity, candles))
    }
}

/// Trim and upper-case a ticker, rejecting anything that is not alphanumeric
pub fn normalize_symbol(symbol: &str) -> Result<String, FetchError> {
    let symbol = symbol.trim().to_uppercase();

    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FetchError::InvalidSymbol(symbol));
    }

    Ok(symbol)
}

/// Convert raw kline rows into candles, oldest first
///
/// Row layout: `[open_time, open, high, low, close, volume, close_time, ...]`.
/// Rows whose open time, high, low or close cannot be read are dropped;
/// an unreadable open or volume becomes NaN.
pub fn parse_kline_rows(rows: &[Vec<Value>]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline_row(row)).collect();
    candles.sort_by_key(|c| c.timestamp);
    candles
}

fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }

    let timestamp = DateTime::from_timestamp_millis(row[0].as_i64()?)?;
    let high = coerce_f64(&row[2])?;
    let low = coerce_f64(&row[3])?;
    let close = coerce_f64(&row[4])?;

    Some(Candle {
        timestamp,
        open: coerce_f64(&row[1]).unwrap_or(f64::NAN),
        high,
        low,
        close,
        volume: coerce_f64(&row[5]).unwrap_or(f64::NAN),
    })
}

/// Binance sends prices as strings; accept plain numbers too
fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}
