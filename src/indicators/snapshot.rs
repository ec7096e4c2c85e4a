use super::{adx_warmup, calculate_adx, calculate_atr, calculate_macd, calculate_rsi, macd_warmup};
use crate::error::InsufficientData;
use crate::models::{Candle, IndicatorSnapshot};
use serde::{Deserialize, Serialize};

/// Lookback periods for the indicator basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPeriods {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_period: 14,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

impl IndicatorPeriods {
    /// Candles needed before every indicator in the basket has a value
    pub fn warmup(&self) -> usize {
        macd_warmup(self.macd_slow, self.macd_signal)
            .max(adx_warmup(self.adx_period))
            .max(self.rsi_period + 1)
            .max(self.atr_period + 1)
    }
}

/// Compute the full indicator basket at the most recent candle
///
/// `min_candles` is the caller's minimum-data policy; the effective minimum is
/// never below the basket warm-up.
pub fn compute_snapshot(
    candles: &[Candle],
    periods: &IndicatorPeriods,
    min_candles: usize,
) -> Result<IndicatorSnapshot, InsufficientData> {
    let need = min_candles.max(periods.warmup());
    let insufficient = InsufficientData {
        have: candles.len(),
        need,
    };

    if candles.len() < need {
        return Err(insufficient);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let macd = calculate_macd(
        &closes,
        periods.macd_fast,
        periods.macd_slow,
        periods.macd_signal,
    )
    .ok_or(insufficient)?;
    let adx = calculate_adx(candles, periods.adx_period).ok_or(insufficient)?;
    let rsi = calculate_rsi(&closes, periods.rsi_period).ok_or(insufficient)?;
    let atr = calculate_atr(candles, periods.atr_period).ok_or(insufficient)?;

    Ok(IndicatorSnapshot {
        macd: macd.macd,
        macd_signal: macd.signal,
        adx: adx.adx,
        plus_di: adx.plus_di,
        minus_di: adx.minus_di,
        rsi,
        atr,
    })
}
