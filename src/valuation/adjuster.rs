//! Translate a comparable's sale price into the target's terms.
//!
//! Only mileage and the trailer hitch move the price. Other equipment
//! differences (tires, heat pump, autopilot) affect ranking and weight, not the
//! normalized price.

use serde::{Deserialize, Serialize};

use crate::domain::{AuctionRecord, VehicleConfiguration};
use crate::valuation::weights::AdjustmentRates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentFactor {
    Mileage,
    TrailerHitch,
}

impl AdjustmentFactor {
    pub fn display_name(self) -> &'static str {
        match self {
            AdjustmentFactor::Mileage => "Mileage",
            AdjustmentFactor::TrailerHitch => "Trailer Hitch",
        }
    }
}

/// One line of a price adjustment breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    pub factor: AdjustmentFactor,
    pub difference: String,
    /// Signed amount added to the comparable's price.
    pub amount: f64,
    pub rationale: String,
}

/// `adjusted_price == original_price + Σ adjustments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    pub original_price: f64,
    pub adjusted_price: f64,
    pub adjustments: Vec<AdjustmentEntry>,
}

/// Normalize `sale_price` (the comparable's final bid) to the target's
/// mileage and hitch equipment.
///
/// Zero-amount lines are left out of the breakdown: identical mileage or
/// matching hitch equipment produce no entry.
pub fn adjust_price(
    target: &VehicleConfiguration,
    candidate: &AuctionRecord,
    sale_price: f64,
    rates: &AdjustmentRates,
) -> PriceAdjustment {
    let mut adjustments = Vec::with_capacity(2);

    // More km on the comparable than on the target: it would have fetched more
    // at the target's mileage, so its price moves up (and vice versa).
    let mileage_delta = f64::from(candidate.vehicle.mileage_km) - f64::from(target.mileage_km);
    let mileage_amount = mileage_delta * rates.mileage_rate(target.model);
    if mileage_amount != 0.0 {
        let delta_k = (mileage_delta / 1000.0).abs();
        adjustments.push(AdjustmentEntry {
            factor: AdjustmentFactor::Mileage,
            difference: format!("{:.0}k km", mileage_delta / 1000.0),
            amount: mileage_amount,
            rationale: if mileage_delta > 0.0 {
                format!("Comparable has {delta_k:.0}k more km")
            } else {
                format!("Comparable has {delta_k:.0}k fewer km")
            },
        });
    }

    match (target.has_hitch, candidate.vehicle.has_hitch) {
        (true, false) => adjustments.push(AdjustmentEntry {
            factor: AdjustmentFactor::TrailerHitch,
            difference: "Adding hitch value".to_string(),
            amount: rates.hitch,
            rationale: "Your car has hitch, comparable does not".to_string(),
        }),
        (false, true) => adjustments.push(AdjustmentEntry {
            factor: AdjustmentFactor::TrailerHitch,
            difference: "Subtracting hitch value".to_string(),
            amount: -rates.hitch,
            rationale: "Comparable has hitch, your car does not".to_string(),
        }),
        _ => {}
    }

    let adjusted_price = sale_price + adjustments.iter().map(|a| a.amount).sum::<f64>();

    PriceAdjustment {
        original_price: sale_price,
        adjusted_price,
        adjustments,
    }
}
