/// Calculate Exponential Moving Average (EMA)
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    calculate_ema_series(prices, period).last().copied()
}

/// EMA for every point from index `period - 1` onwards, seeded with the SMA
/// of the first `period` values.
///
/// Returns an empty vector if there are fewer than `period` prices.
pub fn calculate_ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    let initial_sma = prices[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(prices.len() - period + 1);
    series.push(initial_sma);

    let mut ema = initial_sma;
    for price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
        series.push(ema);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_follows_rising_prices() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        // Seed SMA is 104, the next price pulls it up by a third of the gap
        let ema = calculate_ema(&prices, 5).unwrap();
        assert!((ema - 106.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_needs_full_period() {
        assert!(calculate_ema(&[100.0, 102.0], 5).is_none());
        assert!(calculate_ema(&[100.0, 102.0], 0).is_none());
    }

    #[test]
    fn test_ema_series_alignment() {
        let prices: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let series = calculate_ema_series(&prices, 4);

        // One value per price from index period-1
        assert_eq!(series.len(), 7);
        assert_eq!(series[0], 1.5);
        assert_eq!(series.last().copied(), calculate_ema(&prices, 4));
    }

    #[test]
    fn test_ema_of_constant_is_constant() {
        let prices = vec![42.0; 30];
        let series = calculate_ema_series(&prices, 12);
        assert!(series.iter().all(|v| (*v - 42.0).abs() < 1e-12));
    }
}
