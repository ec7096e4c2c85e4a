use super::{
    recommendation::build_recommendation,
    signals::{classify, find_spacing_issue, SignalConfig},
    Strategy,
};
use crate::error::InsufficientData;
use crate::indicators::compute_snapshot;
use crate::models::{AnalysisResult, CandleSeries};

/// Trend-following strategy
///
/// Identifies directional markets using:
/// - ADX for trend strength
/// - MACD against its signal line for direction
/// - RSI to avoid entering overbought/oversold moves
///
/// Targets and stops are sized from ATR.
#[derive(Debug, Clone, Default)]
pub struct TrendStrategy {
    config: SignalConfig,
}

impl TrendStrategy {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

impl Strategy for TrendStrategy {
    fn analyze(&self, series: &CandleSeries) -> Result<AnalysisResult, InsufficientData> {
        let need = self.min_candles_required();
        if series.len() < need {
            return Err(InsufficientData {
                have: series.len(),
                need,
            });
        }

        // Irregular spacing still gets analyzed, it only skews the indicators
        if let Some(issue) = find_spacing_issue(&series.candles, series.granularity.duration()) {
            tracing::warn!(symbol = %series.symbol, "Irregular candle spacing: {}", issue);
        }

        let snapshot =
            compute_snapshot(&series.candles, &self.config.periods, self.config.min_candles)?;
        let (trend, signal) = classify(&snapshot, &self.config);

        tracing::debug!(
            symbol = %series.symbol,
            "Indicators: MACD={:.6}, Signal={:.6}, ADX={:.2} (+DI={:.2}, -DI={:.2}), RSI={:.2}, ATR={:.6} -> {} / {}",
            snapshot.macd,
            snapshot.macd_signal,
            snapshot.adx,
            snapshot.plus_di,
            snapshot.minus_di,
            snapshot.rsi,
            snapshot.atr,
            trend,
            signal
        );

        let last_close = series.last_close().ok_or(InsufficientData {
            have: 0,
            need,
        })?;
        let recommendation =
            build_recommendation(last_close, snapshot.atr, signal, self.config.atr_multiplier);

        Ok(AnalysisResult {
            trend,
            signal,
            recommendation,
            snapshot: Some(snapshot),
        })
    }

    fn name(&self) -> &str {
        "TrendStrategy"
    }

    fn min_candles_required(&self) -> usize {
        self.config.min_candles.max(self.config.periods.warmup())
    }
}
