//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the valuation code stays clean and testable
//! - output changes are localized

use crate::data::cleaning::variant_display_name;
use crate::domain::{AuctionRecord, VehicleConfiguration};
use crate::io::ingest::LedgerData;
use crate::valuation::{
    BacktestEntry, BacktestReport, DealerInsights, HistoricalValuation, Neighbor, NeighborProfile,
    PayoutQuote, ValuationResult,
};

/// Ledger ingest stats, including the first few rejected rows.
pub fn format_ledger_summary(ledger: &LedgerData, source: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Ledger: {source} | rows read={} used={} rejected={}\n",
        ledger.rows_read,
        ledger.rows_used,
        ledger.row_errors.len()
    ));
    for e in ledger.row_errors.iter().take(5) {
        out.push_str(&format!(
            "  line {} ({}): {}\n",
            e.line,
            e.id.as_deref().unwrap_or("-"),
            e.message
        ));
    }
    if ledger.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", ledger.row_errors.len() - 5));
    }
    out
}

/// One-line description of a configuration.
pub fn describe_vehicle(v: &VehicleConfiguration) -> String {
    let variant = variant_display_name(&v.variant).unwrap_or(v.variant.as_str());
    format!(
        "{variant}{} | {} | {} km | reg {} | AP {} | tires {} | heat pump {} | hitch {}{}",
        if v.is_highland { " (Highland)" } else { "" },
        v.tax_type.label(),
        fmt_thousands(i64::from(v.mileage_km)),
        v.first_registration,
        v.autopilot,
        v.tire_strategy.label(),
        yes_no(v.has_heat_pump),
        yes_no(v.has_hitch),
        if v.accident_free { "" } else { " | accident history" },
    )
}

/// Headline valuation block plus the per-neighbor breakdown.
pub fn format_valuation(
    vehicle: &VehicleConfiguration,
    result: &ValuationResult,
    payout: Option<&PayoutQuote>,
) -> String {
    let mut out = String::new();
    out.push_str("=== comps - Comparable Sales Valuation ===\n");
    out.push_str(&format!("Target: {}\n", describe_vehicle(vehicle)));
    out.push_str(&format_result(result, payout));
    out
}

/// Estimate, range, cohort stats and neighbors; the failure reason otherwise.
fn format_result(result: &ValuationResult, payout: Option<&PayoutQuote>) -> String {
    let mut out = String::new();
    let Some(valuation) = result.valuation() else {
        let error = result.error().map(|e| e.message()).unwrap_or("No estimate");
        out.push_str(&format!(
            "\nNo estimate: {error} (cohort size {}).\n",
            result.cohort_size()
        ));
        return out;
    };

    out.push_str(&format!("Age: {} months\n\n", valuation.target_age_months));
    out.push_str(&format!(
        "Estimated value: {}\n",
        fmt_thousands(valuation.estimated_value)
    ));
    out.push_str(&format!(
        "Range: {} - {}\n",
        fmt_thousands(valuation.confidence_range.min),
        fmt_thousands(valuation.confidence_range.max)
    ));
    out.push_str(&format!(
        "Cohort: {} comparables | avg price {}\n",
        valuation.cohort_stats.size,
        fmt_thousands(valuation.cohort_stats.avg_price)
    ));
    if let Some(quote) = payout {
        out.push_str(&format!(
            "Payout: {} (deduction {})\n",
            fmt_thousands(quote.payout),
            fmt_thousands(quote.deduction_margin.round() as i64)
        ));
    }

    out.push_str("\nNeighbors:\n");
    out.push_str(&format_neighbors(&valuation.neighbors));
    out
}

/// Neighbor table followed by each neighbor's penalty/adjustment breakdown.
pub fn format_neighbors(neighbors: &[Neighbor]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<3} {:<14} {:<10} {:>9} {:>5} {:<7} {:>9} {:>10} {:>10} {:>7}\n",
            "#", "auction", "closed", "km", "age", "tier", "distance", "price", "adjusted", "weight"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<3} {:-<14} {:-<10} {:-<9} {:-<5} {:-<7} {:-<9} {:-<10} {:-<10} {:-<7}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (idx, n) in neighbors.iter().enumerate() {
        let r = &n.record;
        out.push_str(
            format!(
                "{:<3} {:<14} {:<10} {:>9} {:>5} {:<7} {:>9.1} {:>10} {:>10} {:>6.1}%\n",
                idx + 1,
                truncate(&r.auction_id, 14),
                r.end_time.date_naive(),
                fmt_thousands(i64::from(r.vehicle.mileage_km)),
                r.age_at_auction_months,
                truncate(r.trust_tier.label(), 7),
                n.distance,
                fmt_thousands(n.original_price.round() as i64),
                fmt_thousands(n.adjusted_price.round() as i64),
                n.weight_percentage,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    for (idx, n) in neighbors.iter().enumerate() {
        out.push_str(&format!("\n#{} {}\n", idx + 1, n.record.auction_id));
        out.push_str("  penalties:\n");
        for p in &n.penalties {
            out.push_str(&format!(
                "    {:<11} {:<22} {:>8.1}\n",
                p.factor.display_name(),
                truncate(&p.difference, 22),
                p.penalty
            ));
        }
        if n.price_adjustments.is_empty() {
            out.push_str("  adjustments: none\n");
        } else {
            out.push_str("  adjustments:\n");
            for a in &n.price_adjustments {
                out.push_str(&format!(
                    "    {:<13} {:>+8.0}  {}\n",
                    a.factor.display_name(),
                    a.amount,
                    a.rationale
                ));
            }
        }
    }

    out
}

/// A historical (backtest-safe) valuation: the source auction, how the
/// estimate compares to its outcome, then the full glass-box result.
pub fn format_historical(historical: &HistoricalValuation) -> String {
    let source = &historical.source_auction;
    let mut out = String::new();
    out.push_str("=== comps - Historical Valuation (data before close only) ===\n");
    out.push_str(&format!(
        "Auction {} closed {} | status {} | final bid {}\n",
        source.auction_id,
        source.end_time.format("%Y-%m-%d %H:%M"),
        if source.status.is_empty() { "-" } else { source.status.as_str() },
        fmt_price(source),
    ));
    out.push_str(&format!("Vehicle: {}\n", describe_vehicle(&source.vehicle)));
    out.push_str(&format!(
        "History before close: {} matching auctions\n",
        historical.full_cohort.len()
    ));
    if let (Some(estimate), Some(actual)) = (historical.result.estimated_value(), source.sale_price()) {
        let error = estimate as f64 - actual;
        out.push_str(&format!(
            "Estimate vs actual: {:+} ({:+.1}%)\n",
            error.round() as i64,
            error / actual * 100.0
        ));
    }
    out.push_str(&format_result(&historical.result, None));
    out
}

pub fn format_insights(insights: &DealerInsights, profile: Option<&NeighborProfile>) -> String {
    let mut out = String::new();
    out.push_str("Market insights:\n");
    out.push_str(&format!(
        "  cohort {} | acceptance rate {:.0}% | avg bids {}\n",
        insights.cohort_size, insights.acceptance_rate, insights.avg_bid_count
    ));
    out.push_str(&format!(
        "  declined avg bid {} | accepted avg price {}\n",
        fmt_opt(insights.declined_avg_bid),
        fmt_opt(insights.accepted_avg_price)
    ));
    out.push_str(&format!(
        "  win probability {}% ({})\n",
        insights.win_probability,
        insights.win_outlook.label()
    ));
    if let Some(p) = profile {
        out.push_str(&format!(
            "  typical neighbor: {} km, {} months\n",
            fmt_thousands(p.avg_mileage_km),
            p.avg_age_months
        ));
    }
    out
}

/// Backtest table, skipped targets and aggregate error stats.
pub fn format_backtest(report: &BacktestReport) -> String {
    let mut out = String::new();
    out.push_str("=== comps - Backtest (no look-ahead) ===\n");
    out.push_str(&format_backtest_table(&report.entries));

    if !report.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for s in &report.skipped {
            out.push_str(&format!(
                "  {} - {} (cohort {})\n",
                s.auction_id,
                s.reason.message(),
                s.cohort_size
            ));
        }
    }

    out.push('\n');
    match &report.summary {
        Some(s) => {
            out.push_str(&format!("Evaluated: {} (skipped {})\n", s.evaluated, s.skipped));
            out.push_str(&format!("Mean abs error: {:.2}%\n", s.mean_abs_error_pct));
            out.push_str(&format!("Median abs error: {:.2}%\n", s.median_abs_error_pct));
            out.push_str(&format!("Bias (mean signed error): {:+.2}%\n", s.mean_signed_error_pct));
        }
        None => out.push_str("No target could be evaluated.\n"),
    }
    out
}

fn format_backtest_table(entries: &[BacktestEntry]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<14} {:<6} {:<10} {:>10} {:>10} {:>9} {:>8} {:>3}\n",
            "auction", "var", "closed", "actual", "predicted", "error", "err%", "k"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<14} {:-<6} {:-<10} {:-<10} {:-<10} {:-<9} {:-<8} {:-<3}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');
    for e in entries {
        out.push_str(
            format!(
                "{:<14} {:<6} {:<10} {:>10} {:>10} {:>9} {:>+7.1}% {:>3}\n",
                truncate(&e.auction_id, 14),
                truncate(&e.variant, 6),
                e.end_time.date_naive(),
                fmt_thousands(e.actual_price.round() as i64),
                fmt_thousands(e.predicted_value),
                fmt_signed(e.error.round() as i64),
                e.signed_error_pct,
                e.neighbor_count,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// `1234567` -> `1,234,567`.
pub fn fmt_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fmt_signed(v: i64) -> String {
    if v > 0 {
        format!("+{}", fmt_thousands(v))
    } else {
        fmt_thousands(v)
    }
}

fn fmt_opt(v: Option<i64>) -> String {
    v.map(fmt_thousands).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_price(r: &AuctionRecord) -> String {
    r.final_price
        .map(|p| fmt_thousands(p.round() as i64))
        .unwrap_or_else(|| "none".to_string())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::{ValuationEngine, ValuationError};
    use crate::valuation::test_support::{record, vehicle};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn thousands_separator() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1_000), "1,000");
        assert_eq!(fmt_thousands(-1_234_567), "-1,234,567");
        assert_eq!(fmt_signed(250), "+250");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 5), "abcd.");
    }

    #[test]
    fn valuation_report_shows_breakdown() {
        let reference = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        let mut hitched = vehicle(55_000);
        hitched.has_hitch = true;
        let records = vec![
            record("A", vehicle(45_000), reference - Duration::days(20), 30_000.0),
            record("B", hitched, reference - Duration::days(40), 29_000.0),
        ];
        let result = ValuationEngine::default().estimate(&vehicle(50_000), &records, Some(reference));
        let quote = PayoutQuote::from_estimate(result.estimated_value().unwrap(), 1_000.0);

        let text = format_valuation(&vehicle(50_000), &result, Some(&quote));
        assert!(text.contains("Model 3 Long Range"));
        assert!(text.contains("Estimated value:"));
        assert!(text.contains("Payout:"));
        assert!(text.contains("Trust Tier"));
        assert!(text.contains("Comparable has hitch, your car does not"));
    }

    #[test]
    fn historical_report_shows_estimate_and_breakdown() {
        let close = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        let mut hitched = vehicle(55_000);
        hitched.has_hitch = true;
        let records = vec![
            record("A", vehicle(45_000), close - Duration::days(20), 30_000.0),
            record("B", hitched, close - Duration::days(40), 29_000.0),
            record("T", vehicle(50_000), close, 29_500.0),
        ];
        let historical = ValuationEngine::default().estimate_for_historical_auction(&records[2], &records);
        let valuation = historical.result.valuation().unwrap();

        let text = format_historical(&historical);
        assert!(text.contains("Auction T closed"));
        assert!(text.contains(&format!("Estimated value: {}", fmt_thousands(valuation.estimated_value))));
        assert!(text.contains(&format!(
            "Range: {} - {}",
            fmt_thousands(valuation.confidence_range.min),
            fmt_thousands(valuation.confidence_range.max)
        )));
        assert!(text.contains("penalties:"));
        assert!(text.contains("Comparable has hitch, your car does not"));
        assert!(text.contains("Estimate vs actual:"));
    }

    #[test]
    fn historical_report_without_estimate_gives_reason() {
        let close = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        let records = vec![record("T", vehicle(50_000), close, 29_500.0)];
        let historical = ValuationEngine::default().estimate_for_historical_auction(&records[0], &records);

        let text = format_historical(&historical);
        assert!(text.contains("No estimate: No comparable vehicles found for this configuration (cohort size 0)."));
        assert!(!text.contains("Estimate vs actual"));
    }

    #[test]
    fn failed_valuation_reports_reason() {
        let result = ValuationResult::unavailable(ValuationError::EmptyCohort, 0);
        let text = format_valuation(&vehicle(50_000), &result, None);
        assert!(text.contains("No comparable vehicles found for this configuration"));
        assert!(!text.contains("Estimated value"));
    }
}
