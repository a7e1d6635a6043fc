use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AuctionRecord, VehicleConfiguration};

/// The configuration being valued, pinned to a reference instant.
///
/// Pinning the reference once (instead of reading the clock per comparable)
/// keeps a whole valuation consistent and lets backtests value a car "as of"
/// an auction's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationTarget {
    pub vehicle: VehicleConfiguration,
    pub reference: DateTime<Utc>,
    pub age_months: u32,
}

impl ValuationTarget {
    pub fn at(vehicle: VehicleConfiguration, reference: DateTime<Utc>) -> Self {
        let age_months = vehicle.age_months(reference.date_naive());
        Self {
            vehicle,
            reference,
            age_months,
        }
    }

    /// Value as of the current wall-clock time.
    pub fn now(vehicle: VehicleConfiguration) -> Self {
        Self::at(vehicle, Utc::now())
    }

    /// The configuration of a historical auction, valued at its own close.
    pub fn for_auction(auction: &AuctionRecord) -> Self {
        Self::at(auction.vehicle.clone(), auction.end_time)
    }
}
