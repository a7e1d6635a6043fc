//! Market context for a historical valuation: how sellers reacted to bids in
//! the full cohort and where the engine's estimate sits relative to that.

use serde::{Deserialize, Serialize};

use crate::domain::{AuctionOutcome, AuctionRecord};
use crate::valuation::historical::HistoricalValuation;
use crate::valuation::result::Neighbor;

/// Coarse label attached to a win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinOutlook {
    /// Estimate is below what sellers typically turned down.
    VeryLow,
    Medium,
    Good,
    High,
    /// Estimate is at or above the typical accepted price.
    VeryHigh,
}

impl WinOutlook {
    pub fn label(self) -> &'static str {
        match self {
            WinOutlook::VeryLow => "Very Low (Below Rejection Avg)",
            WinOutlook::Medium => "Medium",
            WinOutlook::Good => "Good (Above Rejection Avg)",
            WinOutlook::High => "High",
            WinOutlook::VeryHigh => "Very High (Above Market Avg)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerInsights {
    pub cohort_size: usize,
    /// Share of cohort auctions the seller accepted, percent (0 dp).
    pub acceptance_rate: f64,
    /// Mean final bid among declined auctions ("rejection ceiling").
    pub declined_avg_bid: Option<i64>,
    /// Mean final bid among accepted auctions.
    pub accepted_avg_price: Option<i64>,
    pub avg_bid_count: i64,
    pub win_probability: i64,
    pub win_outlook: WinOutlook,
}

/// Typical vehicle among the selected neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborProfile {
    pub avg_mileage_km: i64,
    pub avg_age_months: i64,
}

/// Insights over `valuation.full_cohort`; `None` when the cohort is empty.
pub fn dealer_insights(valuation: &HistoricalValuation) -> Option<DealerInsights> {
    let cohort = &valuation.full_cohort;
    if cohort.is_empty() {
        return None;
    }

    let accepted: Vec<&AuctionRecord> = cohort
        .iter()
        .filter(|r| r.outcome() == AuctionOutcome::SellerAccepted)
        .collect();
    let declined: Vec<&AuctionRecord> = cohort
        .iter()
        .filter(|r| r.outcome() == AuctionOutcome::SellerDeclined)
        .collect();

    let acceptance_rate = (accepted.len() as f64 / cohort.len() as f64 * 100.0).round();
    let declined_avg_bid = mean_price(&declined);
    let accepted_avg_price = mean_price(&accepted);
    let avg_bid_count = cohort.iter().map(|r| f64::from(r.bid_count)).sum::<f64>() / cohort.len() as f64;

    let estimate = valuation.result.estimated_value().unwrap_or(0);
    let (win_probability, win_outlook) =
        win_probability(estimate, declined_avg_bid, accepted_avg_price);

    Some(DealerInsights {
        cohort_size: cohort.len(),
        acceptance_rate,
        declined_avg_bid,
        accepted_avg_price,
        avg_bid_count: avg_bid_count.round() as i64,
        win_probability,
        win_outlook,
    })
}

/// Heuristic chance that a bid at `estimate` wins the car.
///
/// Below the rejection ceiling: 15. At or above the accepted average: 90.
/// Between the two: 30..80, linear in the position inside the zone. With only
/// a rejection ceiling known and the estimate above it: 60.
pub fn win_probability(
    estimate: i64,
    declined_avg: Option<i64>,
    accepted_avg: Option<i64>,
) -> (i64, WinOutlook) {
    let estimate = estimate as f64;

    if let Some(declined) = declined_avg.map(|v| v as f64)
        && estimate < declined
    {
        return (15, WinOutlook::VeryLow);
    }
    if let Some(accepted) = accepted_avg.map(|v| v as f64)
        && estimate >= accepted
    {
        return (90, WinOutlook::VeryHigh);
    }

    match (declined_avg, accepted_avg) {
        (Some(declined), Some(accepted)) if estimate > declined as f64 => {
            let span = (accepted - declined) as f64;
            let position = if span > 0.0 {
                ((estimate - declined as f64) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let probability = (30.0 + position * 50.0).round() as i64;
            let outlook = if probability > 60 {
                WinOutlook::High
            } else {
                WinOutlook::Medium
            };
            (probability, outlook)
        }
        (Some(declined), None) if estimate > declined as f64 => (60, WinOutlook::Good),
        _ => (50, WinOutlook::Medium),
    }
}

/// Mean mileage and age over the top-k neighbors.
pub fn neighbor_profile(neighbors: &[Neighbor]) -> Option<NeighborProfile> {
    if neighbors.is_empty() {
        return None;
    }
    let n = neighbors.len() as f64;
    let mileage: f64 = neighbors.iter().map(|x| f64::from(x.record.vehicle.mileage_km)).sum();
    let age: f64 = neighbors
        .iter()
        .map(|x| f64::from(x.record.age_at_auction_months))
        .sum();
    Some(NeighborProfile {
        avg_mileage_km: (mileage / n).round() as i64,
        avg_age_months: (age / n).round() as i64,
    })
}

fn mean_price(records: &[&AuctionRecord]) -> Option<i64> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.sale_price()).collect();
    if prices.is_empty() {
        return None;
    }
    Some((prices.iter().sum::<f64>() / prices.len() as f64).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::engine::ValuationEngine;
    use crate::valuation::test_support::{record, vehicle};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn win_probability_zones() {
        assert_eq!(win_probability(25_000, Some(28_000), Some(30_000)), (15, WinOutlook::VeryLow));
        assert_eq!(win_probability(30_000, Some(28_000), Some(30_000)), (90, WinOutlook::VeryHigh));
        assert_eq!(win_probability(29_000, Some(28_000), Some(30_000)), (55, WinOutlook::Medium));
        assert_eq!(win_probability(29_800, Some(28_000), Some(30_000)), (75, WinOutlook::High));
        assert_eq!(win_probability(29_000, Some(28_000), None), (60, WinOutlook::Good));
        assert_eq!(win_probability(29_000, None, Some(30_000)), (50, WinOutlook::Medium));
        assert_eq!(win_probability(29_000, None, None), (50, WinOutlook::Medium));
        // Exactly at the rejection ceiling is neither below nor above it.
        assert_eq!(win_probability(28_000, Some(28_000), Some(30_000)), (50, WinOutlook::Medium));
    }

    #[test]
    fn insights_summarize_the_full_cohort() {
        let close = Utc.with_ymd_and_hms(2024, 8, 1, 10, 0, 0).unwrap();
        let target = record("T", vehicle(50_000), close, 30_000.0);

        let mut records = Vec::new();
        for (i, (price, status, bids)) in [
            (31_000.0, "closed_seller_accepted", 6),
            (30_000.0, "closed_seller_accepted", 4),
            (27_000.0, "closed_seller_declined", 2),
            (26_000.0, "closed_seller_declined", 0),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = record(
                &format!("H{i}"),
                vehicle(45_000 + 2_000 * i as u32),
                close - Duration::days(10 + i as i64),
                price,
            );
            r.status = status.to_string();
            r.bid_count = bids;
            records.push(r);
        }
        records.push(target.clone());

        let historical = ValuationEngine::default().estimate_for_historical_auction(&target, &records);
        let insights = dealer_insights(&historical).unwrap();

        assert_eq!(insights.cohort_size, 4);
        assert_eq!(insights.acceptance_rate, 50.0);
        assert_eq!(insights.declined_avg_bid, Some(26_500));
        assert_eq!(insights.accepted_avg_price, Some(30_500));
        assert_eq!(insights.avg_bid_count, 3);
        assert!((0..=100).contains(&insights.win_probability));

        let profile = neighbor_profile(historical.result.neighbors()).unwrap();
        assert!(profile.avg_mileage_km >= 45_000);
    }

    #[test]
    fn no_cohort_means_no_insights() {
        let close = Utc.with_ymd_and_hms(2024, 8, 1, 10, 0, 0).unwrap();
        let target = record("T", vehicle(50_000), close, 30_000.0);
        let historical =
            ValuationEngine::default().estimate_for_historical_auction(&target, &[target.clone()]);
        assert!(dealer_insights(&historical).is_none());
        assert!(neighbor_profile(historical.result.neighbors()).is_none());
    }
}
