/// Moving Average Convergence Divergence (MACD)
///
/// MACD line = EMA(fast) - EMA(slow) of closing prices.
/// Signal line = EMA(signal) of the MACD line.
///
/// MACD above its signal line indicates strengthening upward momentum,
/// below it indicates strengthening downward momentum.

use super::moving_average::calculate_ema_series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
}

/// Number of prices needed before the signal line has a value
pub fn macd_warmup(slow: usize, signal: usize) -> usize {
    slow + signal - 1
}

/// Calculate the latest MACD and signal line values
///
/// Returns None if insufficient data
pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<MacdValue> {
    if fast == 0 || signal == 0 || fast >= slow || prices.len() < macd_warmup(slow, signal) {
        return None;
    }

    let fast_ema = calculate_ema_series(prices, fast);
    let slow_ema = calculate_ema_series(prices, slow);

    // fast_ema starts at index fast-1, slow_ema at slow-1: align on the slow one
    let offset = slow - fast;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + offset] - slow_value)
        .collect();

    let signal_line = calculate_ema_series(&macd_line, signal);

    Some(MacdValue {
        macd: *macd_line.last()?,
        signal: *signal_line.last()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_insufficient_data() {
        let prices: Vec<f64> = (0..33).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_macd(&prices, 12, 26, 9).is_none());

        let prices: Vec<f64> = (0..34).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_macd(&prices, 12, 26, 9).is_some());
    }

    #[test]
    fn test_macd_flat_market_is_zero() {
        let prices = vec![100.0; 60];
        let value = calculate_macd(&prices, 12, 26, 9).unwrap();
        assert!(value.macd.abs() < 1e-9);
        assert!(value.signal.abs() < 1e-9);
    }

    #[test]
    fn test_macd_accelerating_uptrend_above_signal() {
        // Quadratic growth: momentum keeps increasing
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i * i) as f64 * 0.05).collect();
        let value = calculate_macd(&prices, 12, 26, 9).unwrap();

        assert!(value.macd > 0.0);
        assert!(value.macd > value.signal, "MACD {:?}", value);
    }

    #[test]
    fn test_macd_accelerating_downtrend_below_signal() {
        let prices: Vec<f64> = (0..60).map(|i| 500.0 - (i * i) as f64 * 0.05).collect();
        let value = calculate_macd(&prices, 12, 26, 9).unwrap();

        assert!(value.macd < 0.0);
        assert!(value.macd < value.signal, "MACD {:?}", value);
    }

    #[test]
    fn test_invalid_periods() {
        let prices = vec![100.0; 60];
        assert!(calculate_macd(&prices, 26, 12, 9).is_none());
        assert!(calculate_macd(&prices, 0, 26, 9).is_none());
    }
}
