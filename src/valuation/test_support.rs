//! Fixture builders shared by the valuation unit tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    AuctionRecord, ModelFamily, TaxTreatment, TireStrategy, TrustTier, VehicleConfiguration,
    age_at_auction_months,
};
use crate::valuation::target::ValuationTarget;

/// Model 3 Long Range, margin taxed, summer tires, registered June 2022.
pub fn vehicle(mileage_km: u32) -> VehicleConfiguration {
    VehicleConfiguration {
        model: ModelFamily::Model3,
        variant: "m3_lr".to_string(),
        is_highland: false,
        tax_type: TaxTreatment::Margin,
        accident_free: true,
        autopilot: "Standard".to_string(),
        tire_strategy: TireStrategy::FourSummer,
        has_heat_pump: false,
        has_hitch: false,
        mileage_km,
        first_registration: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
    }
}

/// A Tier 1 accepted auction for `vehicle`.
pub fn record(
    id: &str,
    vehicle: VehicleConfiguration,
    end_time: DateTime<Utc>,
    price: f64,
) -> AuctionRecord {
    AuctionRecord {
        auction_id: id.to_string(),
        age_at_auction_months: age_at_auction_months(vehicle.first_registration, end_time),
        vehicle,
        end_time,
        final_price: Some(price),
        status: "closed_seller_accepted".to_string(),
        bid_count: 5,
        trust_tier: TrustTier::Tier1,
    }
}

pub fn target_at(vehicle: VehicleConfiguration, reference: DateTime<Utc>) -> ValuationTarget {
    ValuationTarget::at(vehicle, reference)
}
