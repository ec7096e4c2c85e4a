// Trading strategy module
pub mod recommendation;
pub mod signals;
pub mod trend;

use crate::error::InsufficientData;
use crate::models::{AnalysisResult, CandleSeries};

pub use trend::TrendStrategy;

/// Base trait for analysis strategies
pub trait Strategy: Send + Sync {
    /// Analyze a candle series into trend, signal and recommendation
    fn analyze(&self, series: &CandleSeries) -> Result<AnalysisResult, InsufficientData>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum candles required for this strategy
    fn min_candles_required(&self) -> usize;
}
