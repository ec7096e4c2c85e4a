/// Average True Range (ATR), Wilder-smoothed
///
/// Volatility in price units. Used to place take-profit and stop-loss levels
/// a fixed number of ATRs away from the entry.

use super::adx::wilder_smooth_series;
use crate::models::Candle;

/// Largest of the candle's own range and its distance from the previous close
pub(crate) fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    (candle.high - candle.low)
        .max((candle.high - prev_close).abs())
        .max((candle.low - prev_close).abs())
}

/// ATR at the last candle, or None with fewer than `period + 1` candles
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    calculate_atr_series(candles, period).last().copied()
}

/// Every ATR value from the first complete window onwards
///
/// The first value corresponds to candle index `period`.
pub fn calculate_atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() <= period {
        return Vec::new();
    }

    let ranges: Vec<f64> = candles
        .windows(2)
        .map(|pair| true_range(&pair[1], pair[0].close))
        .collect();

    wilder_smooth_series(&ranges, period)
}
