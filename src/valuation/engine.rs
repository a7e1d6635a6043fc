//! Weighted k-nearest-neighbor valuation.
//!
//! Pipeline per call:
//!
//! 1. pin the target to its reference instant (age in months)
//! 2. cohort = hard categorical matches with a usable price
//! 3. score every member, stable-sort ascending by distance
//! 4. keep the first `k`, normalize their prices to the target, weight by IDW
//! 5. estimate = weighted mean of adjusted prices, range = min/max of them
//!
//! The engine holds only its rate tables; every call is pure and may run
//! concurrently against the same record slice.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{AuctionRecord, VehicleConfiguration};
use crate::valuation::adjuster::adjust_price;
use crate::valuation::cohort::{CohortMember, select_cohort};
use crate::valuation::result::{
    CohortStats, ConfidenceRange, Neighbor, Valuation, ValuationError, ValuationResult,
};
use crate::valuation::scorer::{DistanceScore, score_candidate};
use crate::valuation::target::ValuationTarget;
use crate::valuation::weights::ValuationWeights;

#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    weights: ValuationWeights,
}

impl ValuationEngine {
    pub fn new(weights: ValuationWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ValuationWeights {
        &self.weights
    }

    /// Value `vehicle` against `records`.
    ///
    /// `reference` defaults to the current time; historical callers must pass
    /// the close time they are valuing at.
    pub fn estimate<'a, I>(
        &self,
        vehicle: &VehicleConfiguration,
        records: I,
        reference: Option<DateTime<Utc>>,
    ) -> ValuationResult
    where
        I: IntoIterator<Item = &'a AuctionRecord>,
    {
        let target = match reference {
            Some(reference) => ValuationTarget::at(vehicle.clone(), reference),
            None => ValuationTarget::now(vehicle.clone()),
        };
        self.estimate_target(&target, records)
    }

    /// Value an already pinned target.
    pub fn estimate_target<'a, I>(&self, target: &ValuationTarget, records: I) -> ValuationResult
    where
        I: IntoIterator<Item = &'a AuctionRecord>,
    {
        let cohort = select_cohort(&target.vehicle, records);
        let cohort_size = cohort.len();
        if cohort.is_empty() {
            debug!(variant = %target.vehicle.variant, "empty cohort");
            return ValuationResult::unavailable(ValuationError::EmptyCohort, 0);
        }

        let mut scored: Vec<(CohortMember<'_>, DistanceScore)> = cohort
            .iter()
            .map(|member| {
                let score = score_candidate(target, member.record, &self.weights.distance);
                (*member, score)
            })
            .collect();
        // `sort_by` is stable: equal distances keep ledger order.
        scored.sort_by(|a, b| a.1.total.partial_cmp(&b.1.total).unwrap_or(Ordering::Equal));
        scored.truncate(self.weights.k_neighbors);

        if scored.is_empty() {
            return ValuationResult::unavailable(ValuationError::NoNeighbors, cohort_size);
        }

        let mut neighbors: Vec<Neighbor> = scored
            .into_iter()
            .map(|(member, score)| {
                let adjustment = adjust_price(
                    &target.vehicle,
                    member.record,
                    member.price,
                    &self.weights.adjustments,
                );
                Neighbor {
                    record: member.record.clone(),
                    distance: score.total,
                    penalties: score.penalties,
                    original_price: adjustment.original_price,
                    adjusted_price: adjustment.adjusted_price,
                    price_adjustments: adjustment.adjustments,
                    weight: self.weights.idw_weight(score.total),
                    weight_percentage: 0.0,
                }
            })
            .collect();

        let total_weight: f64 = neighbors.iter().map(|n| n.weight).sum();
        let weighted_sum: f64 = neighbors.iter().map(|n| n.adjusted_price * n.weight).sum();
        for neighbor in &mut neighbors {
            neighbor.weight_percentage = round_to_tenth(neighbor.weight / total_weight * 100.0);
        }

        let (min_price, max_price) = neighbors.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), n| (lo.min(n.adjusted_price), hi.max(n.adjusted_price)),
        );

        let avg_price = cohort.iter().map(|m| m.price).sum::<f64>() / cohort_size as f64;
        let estimated_value = (weighted_sum / total_weight).round() as i64;

        debug!(
            cohort = cohort_size,
            neighbors = neighbors.len(),
            estimate = estimated_value,
            "valuation complete"
        );

        ValuationResult::Estimated(Valuation {
            estimated_value,
            confidence_range: ConfidenceRange {
                min: min_price.round() as i64,
                max: max_price.round() as i64,
            },
            neighbors,
            cohort_stats: CohortStats {
                size: cohort_size,
                avg_price: avg_price.round() as i64,
            },
            target_age_months: target.age_months,
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
