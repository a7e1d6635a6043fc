//! Export valuations, neighbors, backtests and ledgers to files.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::AuctionRecord;
use crate::error::AppError;
use crate::valuation::{BacktestReport, Valuation, ValuationResult};

/// Write a valuation result (success or failure) as pretty JSON.
pub fn write_valuation_json(path: &Path, result: &ValuationResult) -> Result<(), AppError> {
    write_json(path, result, "valuation")
}

/// Write any serializable report as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create {what} JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::input(format!("Failed to write {what} JSON: {e}")))?;
    Ok(())
}

/// Write one row per selected neighbor.
pub fn write_neighbors_csv(path: &Path, valuation: &Valuation) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create neighbors CSV '{}': {e}", path.display())))?;
    write_neighbors(file, valuation)
}

pub(crate) fn write_neighbors<W: Write>(output: W, valuation: &Valuation) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    let map_err = |e: csv::Error| AppError::input(format!("Failed to write neighbors CSV: {e}"));

    writer
        .write_record([
            "rank",
            "auction_id",
            "end_time",
            "mileage",
            "age_at_auction_months",
            "trust_tier",
            "distance",
            "original_price",
            "adjusted_price",
            "weight",
            "weight_pct",
        ])
        .map_err(map_err)?;

    for (idx, n) in valuation.neighbors.iter().enumerate() {
        let r = &n.record;
        writer
            .write_record([
                (idx + 1).to_string(),
                r.auction_id.clone(),
                r.end_time.to_rfc3339(),
                r.vehicle.mileage_km.to_string(),
                r.age_at_auction_months.to_string(),
                r.trust_tier.label().to_string(),
                format!("{:.4}", n.distance),
                format!("{:.2}", n.original_price),
                format!("{:.2}", n.adjusted_price),
                format!("{:.6e}", n.weight),
                format!("{:.1}", n.weight_percentage),
            ])
            .map_err(map_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush neighbors CSV: {e}")))?;
    Ok(())
}

/// Write per-target backtest rows; skipped targets carry an empty prediction.
pub fn write_backtest_csv(path: &Path, report: &BacktestReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create backtest CSV '{}': {e}", path.display())))?;
    write_backtest(file, report)
}

pub(crate) fn write_backtest<W: Write>(output: W, report: &BacktestReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    let map_err = |e: csv::Error| AppError::input(format!("Failed to write backtest CSV: {e}"));

    writer
        .write_record([
            "auction_id",
            "model",
            "variant",
            "status",
            "end_time",
            "actual_price",
            "predicted_value",
            "error",
            "abs_error_pct",
            "signed_error_pct",
            "neighbors",
            "skip_reason",
        ])
        .map_err(map_err)?;

    for entry in &report.entries {
        writer
            .write_record([
                entry.auction_id.clone(),
                entry.model.clone(),
                entry.variant.clone(),
                entry.status.clone(),
                entry.end_time.to_rfc3339(),
                format!("{:.2}", entry.actual_price),
                entry.predicted_value.to_string(),
                format!("{:.2}", entry.error),
                format!("{:.4}", entry.abs_error_pct),
                format!("{:.4}", entry.signed_error_pct),
                entry.neighbor_count.to_string(),
                String::new(),
            ])
            .map_err(map_err)?;
    }

    for s in &report.skipped {
        let mut row = vec![String::new(); 12];
        row[0] = s.auction_id.clone();
        row[10] = "0".to_string();
        row[11] = s.reason.to_string();
        writer.write_record(&row).map_err(map_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush backtest CSV: {e}")))?;
    Ok(())
}

/// Write records in the ledger ingest schema.
pub fn write_ledger_csv(path: &Path, records: &[AuctionRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create ledger CSV '{}': {e}", path.display())))?;
    write_ledger(file, records)
}

pub(crate) fn write_ledger<W: Write>(output: W, records: &[AuctionRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    let map_err = |e: csv::Error| AppError::input(format!("Failed to write ledger CSV: {e}"));

    writer
        .write_record([
            "auction_id",
            "model",
            "variant_clean",
            "is_highland",
            "tax_type",
            "is_accident_free",
            "tire_strategy",
            "has_hitch",
            "autopilot",
            "has_heatpump",
            "mileage",
            "age_at_auction_months",
            "first_registration",
            "end_time",
            "final_price",
            "status",
            "number_of_bids",
            "trust_tier",
        ])
        .map_err(map_err)?;

    for r in records {
        let v = &r.vehicle;
        writer
            .write_record([
                r.auction_id.clone(),
                v.model.display_name().to_string(),
                v.variant.clone(),
                v.is_highland.to_string(),
                v.tax_type.label().to_string(),
                v.accident_free.to_string(),
                v.tire_strategy.label().to_string(),
                v.has_hitch.to_string(),
                v.autopilot.clone(),
                v.has_heat_pump.to_string(),
                v.mileage_km.to_string(),
                r.age_at_auction_months.to_string(),
                v.first_registration.to_string(),
                r.end_time.to_rfc3339(),
                r.final_price.map(|p| p.to_string()).unwrap_or_default(),
                r.status.clone(),
                r.bid_count.to_string(),
                r.trust_tier.label().to_string(),
            ])
            .map_err(map_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush ledger CSV: {e}")))?;
    Ok(())
}
