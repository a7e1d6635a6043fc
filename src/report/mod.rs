//! Reporting utilities: backtest rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::valuation::BacktestEntry;

/// The `top_n` backtest entries with the largest absolute % error.
pub fn worst_predictions(entries: &[BacktestEntry], top_n: usize) -> Vec<BacktestEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.abs_error_pct
            .partial_cmp(&a.abs_error_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}
