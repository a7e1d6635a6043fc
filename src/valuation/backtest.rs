//! Walk-forward accuracy check of the engine against its own ledger.
//!
//! Each target is valued with the leakage-free historical variant, so the
//! report measures what the engine would have said before the auction closed.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::AuctionRecord;
use crate::valuation::engine::ValuationEngine;
use crate::valuation::result::ValuationError;

/// One evaluated target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestEntry {
    pub auction_id: String,
    pub model: String,
    pub variant: String,
    pub status: String,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub actual_price: f64,
    pub predicted_value: i64,
    /// `predicted - actual`.
    pub error: f64,
    pub abs_error_pct: f64,
    /// Positive when the engine over-predicts.
    pub signed_error_pct: f64,
    pub neighbor_count: usize,
}

/// A target for which no estimate could be made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSkip {
    pub auction_id: String,
    pub reason: ValuationError,
    pub cohort_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub evaluated: usize,
    pub skipped: usize,
    pub mean_abs_error_pct: f64,
    pub median_abs_error_pct: f64,
    pub mean_signed_error_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Most recent target first.
    pub entries: Vec<BacktestEntry>,
    pub skipped: Vec<BacktestSkip>,
    /// `None` when no target could be evaluated.
    pub summary: Option<BacktestSummary>,
}

enum Outcome {
    Evaluated(BacktestEntry),
    Skipped(BacktestSkip),
}

/// The `top_n` most recent closed auctions with a usable price.
pub fn select_targets(records: &[AuctionRecord], top_n: usize) -> Vec<&AuctionRecord> {
    let mut targets: Vec<&AuctionRecord> = records
        .iter()
        .filter(|r| r.outcome().is_closed() && r.sale_price().is_some())
        .collect();
    targets.sort_by(|a, b| b.end_time.cmp(&a.end_time));
    targets.truncate(top_n);
    targets
}

pub fn run_backtest(engine: &ValuationEngine, records: &[AuctionRecord], top_n: usize) -> BacktestReport {
    let targets = select_targets(records, top_n);
    info!(targets = targets.len(), "running backtest");

    let outcomes: Vec<Outcome> = targets
        .par_iter()
        .map(|target| evaluate(engine, target, records))
        .collect();

    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Evaluated(entry) => entries.push(entry),
            Outcome::Skipped(skip) => {
                debug!(auction_id = %skip.auction_id, reason = %skip.reason, "backtest target skipped");
                skipped.push(skip);
            }
        }
    }

    let summary = summarize(&entries, skipped.len());
    BacktestReport {
        entries,
        skipped,
        summary,
    }
}

fn evaluate(engine: &ValuationEngine, target: &AuctionRecord, records: &[AuctionRecord]) -> Outcome {
    let historical = engine.estimate_for_historical_auction(target, records);
    let result = &historical.result;

    // Targets are pre-filtered on a usable price.
    let actual = target.sale_price().unwrap_or_default();
    match result.valuation() {
        Some(valuation) if actual > 0.0 => {
            let predicted = valuation.estimated_value;
            let error = predicted as f64 - actual;
            let signed_error_pct = error / actual * 100.0;
            Outcome::Evaluated(BacktestEntry {
                auction_id: target.auction_id.clone(),
                model: target.vehicle.model.display_name().to_string(),
                variant: target.vehicle.variant.clone(),
                status: target.status.clone(),
                end_time: target.end_time,
                actual_price: actual,
                predicted_value: predicted,
                error,
                abs_error_pct: signed_error_pct.abs(),
                signed_error_pct,
                neighbor_count: valuation.neighbors.len(),
            })
        }
        _ => Outcome::Skipped(BacktestSkip {
            auction_id: target.auction_id.clone(),
            reason: result.error().unwrap_or(ValuationError::NoNeighbors),
            cohort_size: result.cohort_size(),
        }),
    }
}

fn summarize(entries: &[BacktestEntry], skipped: usize) -> Option<BacktestSummary> {
    if entries.is_empty() {
        return None;
    }
    let n = entries.len() as f64;
    let mut abs: Vec<f64> = entries.iter().map(|e| e.abs_error_pct).collect();
    abs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = abs.len() / 2;
    let median = if abs.len() % 2 == 0 {
        (abs[mid - 1] + abs[mid]) / 2.0
    } else {
        abs[mid]
    };

    Some(BacktestSummary {
        evaluated: entries.len(),
        skipped,
        mean_abs_error_pct: abs.iter().sum::<f64>() / n,
        median_abs_error_pct: median,
        mean_signed_error_pct: entries.iter().map(|e| e.signed_error_pct).sum::<f64>() / n,
    })
}
