use crate::models::{Recommendation, TradeDirection, TradeSignal};

/// Turn a signal into entry, take-profit and stop-loss levels
///
/// Levels sit `multiplier * atr` either side of the last close, take-profit
/// in the direction of the signal. No rounding is applied.
pub fn build_recommendation(
    last_close: f64,
    atr: f64,
    signal: TradeSignal,
    multiplier: f64,
) -> Recommendation {
    let distance = atr * multiplier;

    match signal {
        TradeSignal::Buy => Recommendation::Trade {
            direction: TradeDirection::Buy,
            entry_price: last_close,
            take_profit: last_close + distance,
            stop_loss: last_close - distance,
        },
        TradeSignal::Sell => Recommendation::Trade {
            direction: TradeDirection::Sell,
            entry_price: last_close,
            take_profit: last_close - distance,
            stop_loss: last_close + distance,
        },
        TradeSignal::None => Recommendation::NoAction,
    }
}
