use crate::models::{Recommendation, SymbolOutcome, SymbolReport, TradeDirection};
use std::fmt::Write;

/// Decimal places used for price levels
pub const PRICE_DECIMALS: usize = 8;

/// Render one line describing what to do
pub fn render_recommendation(recommendation: &Recommendation) -> String {
    match recommendation {
        Recommendation::NoAction => "No action advised.".to_string(),
        Recommendation::Trade {
            direction,
            entry_price,
            take_profit,
            stop_loss,
        } => {
            let side = match direction {
                TradeDirection::Buy => "Open a buy position",
                TradeDirection::Sell => "Open a sell position",
            };
            format!(
                "{} at {:.prec$}.\n - Take profit (TP): {:.prec$}\n - Stop loss (SL): {:.prec$}",
                side,
                entry_price,
                take_profit,
                stop_loss,
                prec = PRICE_DECIMALS
            )
        }
    }
}

/// Render the text block for one symbol
pub fn render_report(report: &SymbolReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analysis for {}:", report.symbol);

    match &report.outcome {
        SymbolOutcome::Analyzed(result) => {
            let _ = writeln!(out, " - Market trend: {}", result.trend);
            let _ = writeln!(out, " - Trading signal: {}", result.signal);
            let _ = writeln!(
                out,
                " - Conclusion: {}",
                render_recommendation(&result.recommendation)
            );
        }
        SymbolOutcome::NoData { reason } => {
            let _ = writeln!(out, " - No data available ({})", reason);
        }
    }

    out
}

/// Render a whole batch, blocks separated by a blank line
pub fn render_batch(reports: &[SymbolReport]) -> String {
    reports
        .iter()
        .map(render_report)
        .collect::<Vec<_>>()
        .join("\n")
}
