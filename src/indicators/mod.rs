// Technical indicators module
// Implements MACD, RSI, ADX, ATR for trend analysis

pub mod adx;
pub mod atr;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod snapshot;

pub use adx::{adx_warmup, calculate_adx, AdxValue};
pub use atr::{calculate_atr, calculate_atr_series};
pub use macd::{calculate_macd, macd_warmup, MacdValue};
pub use moving_average::{calculate_ema, calculate_ema_series};
pub use rsi::calculate_rsi;
pub use snapshot::{compute_snapshot, IndicatorPeriods};
