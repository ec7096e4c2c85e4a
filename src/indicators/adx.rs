/// Average Directional Index (ADX) with its +DI/-DI components
///
/// ADX is trend strength on a 0-100 scale with no notion of direction;
/// +DI and -DI tell which side is in control.

use super::atr::true_range;
use crate::models::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxValue {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Number of candles needed before the first ADX value exists
pub fn adx_warmup(period: usize) -> usize {
    2 * period
}

/// ADX, +DI and -DI at the last candle
///
/// Needs `2 * period` candles: `period` directional moves to seed the DI
/// lines, then `period` DX values to seed the ADX average.
pub fn calculate_adx(candles: &[Candle], period: usize) -> Option<AdxValue> {
    if period == 0 || candles.len() < adx_warmup(period) {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(candles.len() - 1);
    let mut plus_dms = Vec::with_capacity(candles.len() - 1);
    let mut minus_dms = Vec::with_capacity(candles.len() - 1);

    for window in candles.windows(2) {
        let (prev, current) = (&window[0], &window[1]);

        true_ranges.push(true_range(current, prev.close));

        let up_move = current.high - prev.high;
        let down_move = prev.low - current.low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };

        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        plus_dms.push(plus_dm);
        minus_dms.push(minus_dm);
    }

    let smoothed_tr = wilder_smooth_series(&true_ranges, period);
    let smoothed_plus_dm = wilder_smooth_series(&plus_dms, period);
    let smoothed_minus_dm = wilder_smooth_series(&minus_dms, period);

    let mut dx_series = Vec::with_capacity(smoothed_tr.len());
    let mut last_di = (0.0, 0.0);

    for ((tr, plus_dm), minus_dm) in smoothed_tr
        .iter()
        .zip(&smoothed_plus_dm)
        .zip(&smoothed_minus_dm)
    {
        let (plus_di, minus_di) = if *tr > 0.0 {
            ((plus_dm / tr) * 100.0, (minus_dm / tr) * 100.0)
        } else {
            (0.0, 0.0)
        };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            ((plus_di - minus_di).abs() / di_sum) * 100.0
        } else {
            0.0
        };

        dx_series.push(dx);
        last_di = (plus_di, minus_di);
    }

    let adx = *wilder_smooth_series(&dx_series, period).last()?;

    Some(AdxValue {
        adx,
        plus_di: last_di.0,
        minus_di: last_di.1,
    })
}

/// Wilder's running average: seeded with the mean of the first `period`
/// values, then `(prev * (period - 1) + value) / period`.
pub(crate) fn wilder_smooth_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let n = period as f64;
    let seed = values[..period].iter().sum::<f64>() / n;

    std::iter::once(seed)
        .chain(values[period..].iter().scan(seed, |avg, value| {
            *avg = (*avg * (n - 1.0) + value) / n;
            Some(*avg)
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bars(prices: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let start = Utc::now();
        prices
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                timestamp: start + chrono::Duration::hours(4 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_rising_highs_and_lows() {
        let prices: Vec<(f64, f64, f64, f64)> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64 * 3.0;
                (base, base + 4.0, base - 1.0, base + 3.0)
            })
            .collect();

        let candles = bars(&prices);
        let value = calculate_adx(&candles, 14).unwrap();

        assert!(value.plus_di > value.minus_di, "+DI should be > -DI in uptrend");
        assert!(value.adx > 25.0, "ADX should show a strong trend, got {:.2}", value.adx);
    }

    #[test]
    fn test_falling_highs_and_lows() {
        let prices: Vec<(f64, f64, f64, f64)> = (0..40)
            .map(|i| {
                let base = 300.0 - i as f64 * 3.0;
                (base, base + 1.0, base - 4.0, base - 3.0)
            })
            .collect();

        let candles = bars(&prices);
        let value = calculate_adx(&candles, 14).unwrap();

        assert!(value.minus_di > value.plus_di);
        assert!(value.adx > 25.0);
    }

    #[test]
    fn test_range_bound_market() {
        let prices: Vec<(f64, f64, f64, f64)> = (0..40)
            .map(|i| match i % 4 {
                0 => (100.0, 102.0, 98.0, 100.0),
                1 => (100.0, 103.0, 97.0, 99.0),
                2 => (99.0, 102.0, 98.0, 101.0),
                _ => (101.0, 103.0, 99.0, 100.0),
            })
            .collect();

        let candles = bars(&prices);
        let value = calculate_adx(&candles, 14).unwrap();

        assert!(
            value.adx < 20.0,
            "ADX should be low in choppy market, got {:.2}",
            value.adx
        );
    }

    #[test]
    fn test_warmup_boundary() {
        let prices = vec![(100.0, 102.0, 99.0, 101.0); 27];

        let candles = bars(&prices);
        assert!(calculate_adx(&candles, 14).is_none());

        let prices = vec![(100.0, 102.0, 99.0, 101.0); 28];
        let candles = bars(&prices);
        assert!(calculate_adx(&candles, 14).is_some());
    }

    #[test]
    fn test_wilder_smooth_series() {
        let values = vec![2.0, 4.0, 6.0, 8.0];
        let series = wilder_smooth_series(&values, 2);

        assert_eq!(series, vec![3.0, 4.5, 6.25]);
        assert!(wilder_smooth_series(&values, 5).is_empty());
    }
}
