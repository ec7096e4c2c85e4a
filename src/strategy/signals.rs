use chrono::{DateTime, Duration, Utc};
use crate::indicators::IndicatorPeriods;
use crate::models::{Candle, IndicatorSnapshot, TradeSignal, TrendLabel};
use std::fmt;

/// ADX above this is a trending market
pub const ADX_TRENDING: f64 = 25.0;
/// ADX below this is a ranging market
pub const ADX_RANGING: f64 = 20.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
/// Take-profit and stop-loss distance in ATRs
pub const ATR_MULTIPLIER: f64 = 2.0;
/// Candles required before a series is analyzed
pub const MIN_CANDLES: usize = 50;

/// Configuration for signal generation
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub periods: IndicatorPeriods,
    pub min_candles: usize,
    pub adx_trending: f64,
    pub adx_ranging: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub atr_multiplier: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            periods: IndicatorPeriods::default(),
            min_candles: MIN_CANDLES,
            adx_trending: ADX_TRENDING,
            adx_ranging: ADX_RANGING,
            rsi_overbought: RSI_OVERBOUGHT,
            rsi_oversold: RSI_OVERSOLD,
            atr_multiplier: ATR_MULTIPLIER,
        }
    }
}

impl SignalConfig {
    pub fn with_min_candles(mut self, min_candles: usize) -> Self {
        self.min_candles = min_candles;
        self
    }
}

/// Classify the market from an indicator snapshot
///
/// Evaluated in order:
/// 1. ADX > trending: MACD above signal with RSI not overbought is a buy,
///    MACD below signal with RSI not oversold is a sell, anything else is
///    an unstable trend with no signal.
/// 2. ADX < ranging: sideways, no signal.
/// 3. ADX between the two (inclusive): unstable, no signal.
pub fn classify(snapshot: &IndicatorSnapshot, config: &SignalConfig) -> (TrendLabel, TradeSignal) {
    if snapshot.adx > config.adx_trending {
        if snapshot.macd > snapshot.macd_signal && snapshot.rsi < config.rsi_overbought {
            (TrendLabel::Uptrend, TradeSignal::Buy)
        } else if snapshot.macd < snapshot.macd_signal && snapshot.rsi > config.rsi_oversold {
            (TrendLabel::Downtrend, TradeSignal::Sell)
        } else {
            // Strong trend but MACD/RSI disagree
            (TrendLabel::Unstable, TradeSignal::None)
        }
    } else if snapshot.adx < config.adx_ranging {
        (TrendLabel::Sideways, TradeSignal::None)
    } else {
        (TrendLabel::Unstable, TradeSignal::None)
    }
}

/// Irregularity found in the spacing of a candle series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingIssue {
    /// Candle at `index` opens before its predecessor
    OutOfOrder { index: usize },
    /// Missing candles between two open times
    Gap {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl fmt::Display for SpacingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpacingIssue::OutOfOrder { index } => {
                write!(f, "candle #{} is out of order", index)
            }
            SpacingIssue::Gap { from, to } => write!(
                f,
                "gap of {}h from {} to {}",
                (*to - *from).num_hours(),
                from.format("%Y-%m-%d %H:%M"),
                to.format("%Y-%m-%d %H:%M")
            ),
        }
    }
}

/// Find the first spacing problem in a series, if any
///
/// Consecutive open times may differ by at most 1.5x `interval`.
pub fn find_spacing_issue(candles: &[Candle], interval: Duration) -> Option<SpacingIssue> {
    let max_step = interval + interval / 2;

    candles.windows(2).enumerate().find_map(|(i, pair)| {
        let step = pair[1].timestamp - pair[0].timestamp;
        if step < Duration::zero() {
            Some(SpacingIssue::OutOfOrder { index: i + 1 })
        } else if step > max_step {
            Some(SpacingIssue::Gap {
                from: pair[0].timestamp,
                to: pair[1].timestamp,
            })
        } else {
            None
        }
    })
}
