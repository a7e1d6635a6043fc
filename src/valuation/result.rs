//! Valuation outputs.
//!
//! A `ValuationResult` is either a complete estimate or a failure record; the
//! two never mix. Failures are ordinary values (not `Err`) because "no
//! comparables" is an expected answer for rare configurations.

use serde::{Deserialize, Serialize};

use crate::domain::AuctionRecord;
use crate::valuation::adjuster::AdjustmentEntry;
use crate::valuation::scorer::PenaltyEntry;

/// Why no estimate could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationError {
    /// No ledger row passed the hard cohort filters.
    EmptyCohort,
    /// The cohort was non-empty but nothing survived ranking.
    NoNeighbors,
}

impl ValuationError {
    pub fn message(self) -> &'static str {
        match self {
            ValuationError::EmptyCohort => "No comparable vehicles found for this configuration",
            ValuationError::NoNeighbors => "No valid neighbors found",
        }
    }
}

impl std::fmt::Display for ValuationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A selected comparable with its full scoring and pricing trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    #[serde(flatten)]
    pub record: AuctionRecord,
    pub distance: f64,
    pub penalties: Vec<PenaltyEntry>,
    pub original_price: f64,
    pub adjusted_price: f64,
    pub price_adjustments: Vec<AdjustmentEntry>,
    /// Raw inverse-distance weight.
    pub weight: f64,
    /// Share of the total neighbor weight, rounded to one decimal.
    pub weight_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    pub min: i64,
    pub max: i64,
}

/// Market context over the whole cohort (not just the neighbors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortStats {
    pub size: usize,
    pub avg_price: i64,
}

/// A successful estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub estimated_value: i64,
    pub confidence_range: ConfidenceRange,
    pub neighbors: Vec<Neighbor>,
    pub cohort_stats: CohortStats,
    pub target_age_months: u32,
}

/// A failed estimate, carrying whatever cohort size was known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationFailure {
    pub error: ValuationError,
    pub cohort_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValuationResult {
    Estimated(Valuation),
    Unavailable(ValuationFailure),
}

impl ValuationResult {
    pub fn unavailable(error: ValuationError, cohort_size: usize) -> Self {
        ValuationResult::Unavailable(ValuationFailure { error, cohort_size })
    }

    pub fn valuation(&self) -> Option<&Valuation> {
        match self {
            ValuationResult::Estimated(valuation) => Some(valuation),
            ValuationResult::Unavailable(_) => None,
        }
    }

    pub fn estimated_value(&self) -> Option<i64> {
        self.valuation().map(|v| v.estimated_value)
    }

    pub fn confidence_range(&self) -> Option<ConfidenceRange> {
        self.valuation().map(|v| v.confidence_range)
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        match self {
            ValuationResult::Estimated(valuation) => &valuation.neighbors,
            ValuationResult::Unavailable(_) => &[],
        }
    }

    pub fn cohort_size(&self) -> usize {
        match self {
            ValuationResult::Estimated(valuation) => valuation.cohort_stats.size,
            ValuationResult::Unavailable(failure) => failure.cohort_size,
        }
    }

    pub fn error(&self) -> Option<ValuationError> {
        match self {
            ValuationResult::Estimated(_) => None,
            ValuationResult::Unavailable(failure) => Some(failure.error),
        }
    }
}
