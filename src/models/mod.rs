use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OHLCV candlestick data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>, // Open time
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candle time period supported by the analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    #[serde(rename = "4h", alias = "4H")]
    FourHours,
    #[serde(rename = "1d", alias = "1D")]
    OneDay,
}

impl Granularity {
    /// Interval string as understood by the exchange
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::FourHours => "4h",
            Granularity::OneDay => "1d",
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        match self {
            Granularity::FourHours => chrono::Duration::hours(4),
            Granularity::OneDay => chrono::Duration::days(1),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4h" => Ok(Granularity::FourHours),
            "1d" => Ok(Granularity::OneDay),
            other => Err(format!("Unsupported interval '{}', expected 4h or 1d", other)),
        }
    }
}

/// Ordered candles (oldest first) for one symbol at one granularity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandleSeries {
    pub symbol: String,
    pub granularity: Granularity,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: impl Into<String>, granularity: Granularity, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

/// Indicator values at the most recent candle of a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    pub macd: f64,
    pub macd_signal: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub rsi: f64,
    pub atr: f64,
}

/// Qualitative market state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    Sideways,
    Unstable,
    InsufficientData,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendLabel::Uptrend => "Uptrend",
            TrendLabel::Downtrend => "Downtrend",
            TrendLabel::Sideways => "Sideways",
            TrendLabel::Unstable => "Unstable",
            TrendLabel::InsufficientData => "Insufficient data",
        };
        f.write_str(label)
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TradeSignal {
    Buy,
    Sell,
    None,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeSignal::Buy => "Buy",
            TradeSignal::Sell => "Sell",
            TradeSignal::None => "None",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Entry/target/stop levels derived from a signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Recommendation {
    NoAction,
    Trade {
        direction: TradeDirection,
        entry_price: f64,
        take_profit: f64,
        stop_loss: f64,
    },
}

impl Recommendation {
    pub fn direction(&self) -> Option<TradeDirection> {
        match self {
            Recommendation::NoAction => None,
            Recommendation::Trade { direction, .. } => Some(*direction),
        }
    }
}

/// Result of analyzing one candle series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub trend: TrendLabel,
    pub signal: TradeSignal,
    pub recommendation: Recommendation,
    pub snapshot: Option<IndicatorSnapshot>,
}

impl AnalysisResult {
    /// Neutral result for a series too short to analyze
    pub fn insufficient_data() -> Self {
        Self {
            trend: TrendLabel::InsufficientData,
            signal: TradeSignal::None,
            recommendation: Recommendation::NoAction,
            snapshot: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SymbolOutcome {
    Analyzed(AnalysisResult),
    NoData { reason: String },
}

/// One streamed batch item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.outcome {
            SymbolOutcome::Analyzed(result) => Some(result),
            SymbolOutcome::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.outcome, SymbolOutcome::NoData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("4h".parse::<Granularity>(), Ok(Granularity::FourHours));
        assert_eq!(" 1D ".parse::<Granularity>(), Ok(Granularity::OneDay));
        assert!("15m".parse::<Granularity>().is_err());
        assert_eq!(Granularity::default().as_str(), "4h");
    }

    #[test]
    fn test_granularity_deserialize_any_case() {
        let parsed: Vec<Granularity> = serde_json::from_str(r#"["4h", "4H", "1d", "1D"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Granularity::FourHours,
                Granularity::FourHours,
                Granularity::OneDay,
                Granularity::OneDay
            ]
        );
        assert_eq!(serde_json::to_string(&Granularity::OneDay).unwrap(), r#""1d""#);
    }

    #[test]
    fn test_series_last_close() {
        let candle = Candle {
            timestamp: Utc::now(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        let series = CandleSeries::new("BTCUSDT", Granularity::OneDay, vec![candle]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.last_close(), Some(1.5));
        assert!(CandleSeries::new("X", Granularity::OneDay, vec![])
            .last_close()
            .is_none());
    }

    #[test]
    fn test_insufficient_data_result_is_neutral() {
        let result = AnalysisResult::insufficient_data();
        assert_eq!(result.trend, TrendLabel::InsufficientData);
        assert_eq!(result.signal, TradeSignal::None);
        assert_eq!(result.recommendation.direction(), None);
    }
}
