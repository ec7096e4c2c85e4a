use thiserror::Error;

/// Failure to obtain candles for a symbol from the market-data provider
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error {code}: {msg}")]
    Api { code: i64, msg: String },

    #[error("rate limited by provider (HTTP {status})")]
    RateLimited { status: u16 },

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode kline payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no usable candles returned for {symbol}")]
    EmptySeries { symbol: String },

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),
}

/// Series is shorter than the indicator minimum
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("insufficient data: {have} candles, need {need}")]
pub struct InsufficientData {
    pub have: usize,
    pub need: usize,
}

/// Batch rejected before any symbol is processed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("no symbols given, enter between 1 and {max} symbols")]
    Empty { max: usize },

    #[error("{count} symbols given, at most {max} are allowed per batch")]
    TooMany { count: usize, max: usize },

    #[error("symbol #{index} is blank")]
    BlankSymbol { index: usize },
}
