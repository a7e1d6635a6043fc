//! Distance scoring between the target and one historical comparable.
//!
//! The score is a sum of independent, non-negative penalty terms. Every term is
//! reported in the breakdown (including zero terms) so a reader can see exactly
//! why one comparable ranked above another. Price never enters the score.

use serde::{Deserialize, Serialize};

use crate::domain::{AuctionRecord, TrustTier, days_between_ceil};
use crate::valuation::target::ValuationTarget;
use crate::valuation::weights::DistanceWeights;

/// Named distance factor, in the order the scorer evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyFactor {
    Mileage,
    Age,
    Recency,
    Tires,
    HeatPump,
    Autopilot,
    TrustTier,
}

impl PenaltyFactor {
    pub fn display_name(self) -> &'static str {
        match self {
            PenaltyFactor::Mileage => "Mileage",
            PenaltyFactor::Age => "Age",
            PenaltyFactor::Recency => "Recency",
            PenaltyFactor::Tires => "Tires",
            PenaltyFactor::HeatPump => "Heat Pump",
            PenaltyFactor::Autopilot => "Autopilot",
            PenaltyFactor::TrustTier => "Trust Tier",
        }
    }
}

/// One line of a distance breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEntry {
    pub factor: PenaltyFactor,
    /// Human-readable description of the difference, e.g. `12k km`.
    pub difference: String,
    pub penalty: f64,
}

/// Total distance plus its breakdown; `total == Σ penalties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceScore {
    pub total: f64,
    pub penalties: Vec<PenaltyEntry>,
}

impl DistanceScore {
    fn push(&mut self, factor: PenaltyFactor, difference: String, penalty: f64) {
        self.total += penalty;
        self.penalties.push(PenaltyEntry {
            factor,
            difference,
            penalty,
        });
    }

    pub fn penalty(&self, factor: PenaltyFactor) -> Option<f64> {
        self.penalties
            .iter()
            .find(|entry| entry.factor == factor)
            .map(|entry| entry.penalty)
    }
}

/// Score `candidate` against `target`.
///
/// Recency is measured from the candidate's close to `target.reference`, so a
/// backtest that pins the reference to a past auction never sees "today".
pub fn score_candidate(
    target: &ValuationTarget,
    candidate: &AuctionRecord,
    weights: &DistanceWeights,
) -> DistanceScore {
    let vehicle = &target.vehicle;
    let other = &candidate.vehicle;
    let mut score = DistanceScore {
        total: 0.0,
        penalties: Vec::with_capacity(7),
    };

    let mileage_diff = (f64::from(vehicle.mileage_km) - f64::from(other.mileage_km)).abs();
    score.push(
        PenaltyFactor::Mileage,
        format!("{:.0}k km", mileage_diff / 1000.0),
        mileage_diff * weights.mileage_rate(vehicle.model),
    );

    let age_diff = target.age_months.abs_diff(candidate.age_at_auction_months);
    score.push(
        PenaltyFactor::Age,
        format!("{age_diff} months"),
        f64::from(age_diff) * weights.age_rate(vehicle.model),
    );

    let days = days_between_ceil(candidate.end_time, target.reference);
    score.push(
        PenaltyFactor::Recency,
        format!("{days} days ago"),
        days as f64 * weights.recency_per_day,
    );

    let (tire_diff, tire_penalty) = tire_penalty(target, candidate, weights);
    score.push(PenaltyFactor::Tires, tire_diff.to_string(), tire_penalty);

    let (heat_diff, heat_penalty) = if vehicle.has_heat_pump != other.has_heat_pump {
        ("Mismatch", weights.heat_pump_mismatch)
    } else {
        ("Match", 0.0)
    };
    score.push(PenaltyFactor::HeatPump, heat_diff.to_string(), heat_penalty);

    // Exact label equality: no partial credit between packages.
    if vehicle.autopilot != other.autopilot {
        score.push(
            PenaltyFactor::Autopilot,
            format!("{} vs {}", vehicle.autopilot, other.autopilot),
            weights.autopilot_mismatch,
        );
    } else {
        score.push(PenaltyFactor::Autopilot, "Match".to_string(), 0.0);
    }

    let trust_penalty = match candidate.trust_tier {
        TrustTier::Tier2 => weights.trust_tier_2,
        TrustTier::Tier3 => weights.trust_tier_3,
        TrustTier::Tier1 | TrustTier::Other(_) => 0.0,
    };
    score.push(
        PenaltyFactor::TrustTier,
        candidate.trust_tier.label().to_string(),
        trust_penalty,
    );

    score
}

fn tire_penalty(
    target: &ValuationTarget,
    candidate: &AuctionRecord,
    weights: &DistanceWeights,
) -> (&'static str, f64) {
    let wanted = target.vehicle.tire_strategy;
    let offered = candidate.vehicle.tire_strategy;

    if wanted.is_eight_tires() && !offered.is_eight_tires() {
        ("8 vs 4 tires", weights.tire_8_vs_4)
    } else if !wanted.is_eight_tires() && offered.is_eight_tires() {
        ("4 vs 8 tires", weights.tire_4_vs_8)
    } else if wanted != offered {
        ("Type mismatch", weights.tire_type_mismatch)
    } else {
        ("Match", 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TireStrategy, VehicleConfiguration};
    use crate::valuation::test_support::{record, target_at, vehicle};
    use chrono::{TimeZone, Utc};

    fn weights() -> DistanceWeights {
        DistanceWeights::default()
    }

    #[test]
    fn identical_fresh_tier1_comparable_scores_zero() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let target = target_at(vehicle(50_000), reference);
        let mut candidate = record("A", vehicle(50_000), reference, 30_000.0);
        candidate.age_at_auction_months = target.age_months;

        let score = score_candidate(&target, &candidate, &weights());
        assert_eq!(score.total, 0.0);
        assert_eq!(score.penalties.len(), 7);
        assert!(score.penalties.iter().all(|p| p.penalty == 0.0));
    }

    #[test]
    fn mileage_age_and_recency_use_model_rates() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let target = target_at(vehicle(50_000), reference);
        let closed = Utc.with_ymd_and_hms(2024, 5, 22, 0, 0, 0).unwrap();
        let mut candidate = record("A", vehicle(60_000), closed, 30_000.0);
        candidate.age_at_auction_months = target.age_months + 4;

        let score = score_candidate(&target, &candidate, &weights());
        let mileage = score.penalty(PenaltyFactor::Mileage).unwrap();
        let age = score.penalty(PenaltyFactor::Age).unwrap();
        let recency = score.penalty(PenaltyFactor::Recency).unwrap();

        assert!((mileage - 20.0).abs() < 1e-9);
        assert!((age - 4.0 * 12.6).abs() < 1e-9);
        assert!((recency - 10.0 * 0.49).abs() < 1e-9);
        assert_eq!(score.penalties[0].difference, "10k km");
        assert_eq!(score.penalties[1].difference, "4 months");
        assert_eq!(score.penalties[2].difference, "10 days ago");
    }

    #[test]
    fn model_y_rates_apply_to_model_y_targets() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut v = vehicle(50_000);
        v.model = crate::domain::ModelFamily::ModelY;
        let target = target_at(v.clone(), reference);
        let mut other = v;
        other.mileage_km = 40_000;
        let mut candidate = record("A", other, reference, 30_000.0);
        candidate.age_at_auction_months = target.age_months + 1;

        let score = score_candidate(&target, &candidate, &weights());
        assert!((score.penalty(PenaltyFactor::Mileage).unwrap() - 25.0).abs() < 1e-9);
        assert!((score.penalty(PenaltyFactor::Age).unwrap() - 17.1).abs() < 1e-9);
    }

    #[test]
    fn tire_penalty_is_asymmetric() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let with_tires = |strategy: TireStrategy| VehicleConfiguration {
            tire_strategy: strategy,
            ..vehicle(50_000)
        };

        let cases = [
            (TireStrategy::EightTires, TireStrategy::FourSummer, 32.0, "8 vs 4 tires"),
            (TireStrategy::FourSummer, TireStrategy::EightTires, 22.0, "4 vs 8 tires"),
            (TireStrategy::FourSummer, TireStrategy::FourWinter, 15.0, "Type mismatch"),
            (TireStrategy::FourWinter, TireStrategy::FourWinter, 0.0, "Match"),
            (TireStrategy::EightTires, TireStrategy::EightTires, 0.0, "Match"),
        ];

        for (wanted, offered, expected, label) in cases {
            let target = target_at(with_tires(wanted), reference);
            let candidate = record("A", with_tires(offered), reference, 30_000.0);
            let score = score_candidate(&target, &candidate, &weights());
            let entry = score
                .penalties
                .iter()
                .find(|p| p.factor == PenaltyFactor::Tires)
                .unwrap();
            assert_eq!(entry.penalty, expected, "{wanted:?} vs {offered:?}");
            assert_eq!(entry.difference, label);
        }
    }

    #[test]
    fn equipment_mismatches_add_fixed_penalties() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let target = target_at(vehicle(50_000), reference);
        let mut other = vehicle(50_000);
        other.has_heat_pump = true;
        other.autopilot = "FSD".to_string();
        let candidate = record("A", other, reference, 30_000.0);

        let score = score_candidate(&target, &candidate, &weights());
        assert_eq!(score.penalty(PenaltyFactor::HeatPump), Some(34.0));
        assert_eq!(score.penalty(PenaltyFactor::Autopilot), Some(44.0));
        let autopilot = &score.penalties[5];
        assert_eq!(autopilot.difference, "Standard vs FSD");
    }

    #[test]
    fn trust_tiers_penalize_lower_grades_only() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let target = target_at(vehicle(50_000), reference);

        let tiers = [
            (TrustTier::Tier1, 0.0),
            (TrustTier::Tier2, 20.0),
            (TrustTier::Tier3, 123.0),
            (TrustTier::Other("Tier 4".to_string()), 0.0),
            (TrustTier::Other(String::new()), 0.0),
        ];
        for (tier, expected) in tiers {
            let mut candidate = record("A", vehicle(50_000), reference, 30_000.0);
            candidate.trust_tier = tier.clone();
            let score = score_candidate(&target, &candidate, &weights());
            assert_eq!(score.penalty(PenaltyFactor::TrustTier), Some(expected), "{tier:?}");
        }
    }

    #[test]
    fn total_equals_sum_of_breakdown_and_ignores_price() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let target = target_at(vehicle(42_000), reference);
        let closed = Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap();
        let mut cheap = record("A", vehicle(71_000), closed, 18_000.0);
        cheap.trust_tier = TrustTier::Tier2;
        let mut dear = cheap.clone();
        dear.final_price = Some(41_000.0);

        let a = score_candidate(&target, &cheap, &weights());
        let b = score_candidate(&target, &dear, &weights());
        let sum: f64 = a.penalties.iter().map(|p| p.penalty).sum();
        assert!((a.total - sum).abs() < 1e-9);
        assert!(a.total > 0.0);
        assert_eq!(a, b);
    }
}
