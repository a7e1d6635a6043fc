//! Leakage-free valuation of an auction from the ledger itself.
//!
//! The record set is cut to auctions that closed strictly before the target
//! auction (its own row excluded) before anything else runs, and the target
//! is valued as of its own close. Nothing the target auction revealed can
//! reach its estimate.

use serde::{Deserialize, Serialize};

use crate::domain::AuctionRecord;
use crate::valuation::cohort::{closed_before, cohort_price};
use crate::valuation::engine::ValuationEngine;
use crate::valuation::result::ValuationResult;
use crate::valuation::target::ValuationTarget;

/// A historical estimate plus the full (not top-k) cohort it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalValuation {
    #[serde(flatten)]
    pub result: ValuationResult,
    pub full_cohort: Vec<AuctionRecord>,
    pub source_auction: AuctionRecord,
}

/// Records visible at `target`'s close: strictly earlier, never itself.
pub fn prior_records<'a>(
    target: &AuctionRecord,
    records: &'a [AuctionRecord],
) -> Vec<&'a AuctionRecord> {
    records
        .iter()
        .filter(|record| closed_before(record, target.end_time, &target.auction_id))
        .collect()
}

impl ValuationEngine {
    /// Backtest-safe valuation of `target` against the rest of the ledger.
    pub fn estimate_for_historical_auction(
        &self,
        target: &AuctionRecord,
        records: &[AuctionRecord],
    ) -> HistoricalValuation {
        let visible = prior_records(target, records);
        let pinned = ValuationTarget::for_auction(target);
        let result = self.estimate_target(&pinned, visible.iter().copied());

        let full_cohort = visible
            .into_iter()
            .filter(|record| cohort_price(&pinned.vehicle, record).is_some())
            .cloned()
            .collect();

        HistoricalValuation {
            result,
            full_cohort,
            source_auction: target.clone(),
        }
    }
}
