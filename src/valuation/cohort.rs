//! Cohort selection predicates.
//!
//! Each hard filter is its own function so the categorical match, the
//! comparable-quality gate and the backtest's temporal cut can be tested and
//! composed independently.

use chrono::{DateTime, Utc};

use crate::domain::{AuctionRecord, VehicleConfiguration};

/// A cohort member together with its validated sale price.
#[derive(Debug, Clone, Copy)]
pub struct CohortMember<'a> {
    pub record: &'a AuctionRecord,
    pub price: f64,
}

/// Model, variant, generation and tax treatment must match exactly.
pub fn matches_configuration(target: &VehicleConfiguration, record: &AuctionRecord) -> bool {
    let other = &record.vehicle;
    other.model == target.model
        && other.variant == target.variant
        && other.is_highland == target.is_highland
        && other.tax_type == target.tax_type
}

/// The comparable itself must be accident free. The target's own flag plays
/// no part in cohort membership.
pub fn is_accident_free(record: &AuctionRecord) -> bool {
    record.vehicle.accident_free
}

/// Full cohort predicate; returns the usable price for members.
pub fn cohort_price(target: &VehicleConfiguration, record: &AuctionRecord) -> Option<f64> {
    if !matches_configuration(target, record) || !is_accident_free(record) {
        return None;
    }
    record.sale_price()
}

/// Temporal cut for backtests: strictly earlier close, and never the auction
/// being valued.
pub fn closed_before(record: &AuctionRecord, cutoff: DateTime<Utc>, exclude_id: &str) -> bool {
    record.end_time < cutoff && record.auction_id != exclude_id
}

/// Select the cohort for `target`, preserving input order.
pub fn select_cohort<'a, I>(target: &VehicleConfiguration, records: I) -> Vec<CohortMember<'a>>
where
    I: IntoIterator<Item = &'a AuctionRecord>,
{
    records
        .into_iter()
        .filter_map(|record| cohort_price(target, record).map(|price| CohortMember { record, price }))
        .collect()
}
