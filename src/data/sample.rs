//! Synthetic auction ledger generation.
//!
//! Produces plausible Model 3 / Model Y auctions for demos and tests: prices
//! depreciate with age and mileage, equipment adds small premiums, and a
//! normal noise term keeps the comparables from lining up perfectly. Output is
//! fully determined by the seed.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::cleaning::{is_highland, trust_tier_for, variant_display_name, variant_from_power};
use crate::domain::{
    AuctionRecord, DAYS_PER_MONTH, ModelFamily, TaxTreatment, TireStrategy, VehicleConfiguration,
    age_at_auction_months,
};
use crate::error::AppError;

/// Motor outputs seen in listings, per family (kW).
const M3_POWER_KW: [f64; 6] = [208.0, 235.0, 324.0, 366.0, 377.0, 461.0];
const MY_POWER_KW: [f64; 4] = [220.0, 255.0, 378.0, 390.0];

/// Relative price noise (standard deviation as a share of the price).
const PRICE_NOISE: f64 = 0.04;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Latest possible auction close.
    pub end: DateTime<Utc>,
    /// Auctions close within `span_days` before `end`.
    pub span_days: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 400,
            seed: 7,
            end: Utc.with_ymd_and_hms(2025, 6, 30, 18, 0, 0).single().unwrap_or_default(),
            span_days: 540,
        }
    }
}

pub fn generate_sample_ledger(config: &SampleConfig) -> Result<Vec<AuctionRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    if config.span_days == 0 {
        return Err(AppError::input("Sample span must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let model = if rng.gen_bool(0.5) {
            ModelFamily::Model3
        } else {
            ModelFamily::ModelY
        };
        let kw = match model {
            ModelFamily::Model3 => M3_POWER_KW[rng.gen_range(0..M3_POWER_KW.len())],
            ModelFamily::ModelY => MY_POWER_KW[rng.gen_range(0..MY_POWER_KW.len())],
        };
        let variant = variant_from_power(model, kw);

        let minutes_back = rng.gen_range(0..i64::from(config.span_days) * 24 * 60);
        let end_time = config.end - Duration::minutes(minutes_back);

        let age_months: u32 = rng.gen_range(3..=60);
        let first_registration = (end_time.date_naive()
            - Duration::days((f64::from(age_months) * DAYS_PER_MONTH) as i64))
        .with_day(1)
        .unwrap_or(end_time.date_naive());

        let label = variant_display_name(variant).unwrap_or(model.display_name());
        let highland = is_highland(model, label, first_registration.year(), kw);

        let yearly_km: f64 = rng.gen_range(9_000.0..28_000.0);
        let mileage_km = (f64::from(age_months) / 12.0 * yearly_km).round() as u32;

        let tire_strategy = match rng.gen_range(0..10) {
            0..=2 => TireStrategy::EightTires,
            3..=5 => TireStrategy::FourSummer,
            6..=7 => TireStrategy::FourWinter,
            8 => TireStrategy::FourAllSeason,
            _ => TireStrategy::Unknown,
        };
        let autopilot = match rng.gen_range(0..10) {
            0..=6 => "Standard",
            7..=8 => "EAP",
            _ => "FSD",
        };

        let vehicle = VehicleConfiguration {
            model,
            variant: variant.to_string(),
            is_highland: highland,
            tax_type: if rng.gen_bool(0.25) {
                TaxTreatment::Vat
            } else {
                TaxTreatment::Margin
            },
            accident_free: rng.gen_bool(0.9),
            autopilot: autopilot.to_string(),
            tire_strategy,
            has_heat_pump: highland || model == ModelFamily::ModelY || rng.gen_bool(0.3),
            has_hitch: rng.gen_bool(0.2),
            mileage_km,
            first_registration,
        };

        let fair = fair_price(&vehicle, age_months);
        let price = (fair * (1.0 + PRICE_NOISE * normal.sample(&mut rng))).max(1_000.0).round();

        let (status, final_price) = match rng.gen_range(0..20) {
            0..=10 => ("closed_seller_accepted", Some(price)),
            11..=17 => ("closed_seller_declined", Some((price * 0.95).round())),
            18 => ("active", None),
            _ => ("sold", Some(price)),
        };
        let bid_count = if final_price.is_some() { rng.gen_range(1..15) } else { 0 };

        records.push(AuctionRecord {
            auction_id: format!("S{:05}", i + 1),
            age_at_auction_months: age_at_auction_months(vehicle.first_registration, end_time),
            vehicle,
            end_time,
            final_price,
            status: status.to_string(),
            bid_count,
            trust_tier: trust_tier_for(status, bid_count),
        });
    }

    records.sort_by(|a, b| a.end_time.cmp(&b.end_time));
    Ok(records)
}

/// Noise-free market price of a configuration at a given age.
fn fair_price(vehicle: &VehicleConfiguration, age_months: u32) -> f64 {
    let base = match vehicle.variant.as_str() {
        "m3_sr" => 40_000.0,
        "m3_lr" => 48_000.0,
        "m3_p" => 55_000.0,
        "my_sr" => 44_000.0,
        "my_lr" => 51_000.0,
        "my_p" => 58_000.0,
        _ => 42_000.0,
    };
    let depreciation = (1.0 - 0.011 * f64::from(age_months)).max(0.35);
    let mut price = base * depreciation - f64::from(vehicle.mileage_km) * 0.05;

    if vehicle.is_highland {
        price += 4_000.0;
    }
    if vehicle.has_heat_pump {
        price += 500.0;
    }
    if vehicle.has_hitch {
        price += 250.0;
    }
    if vehicle.tire_strategy == TireStrategy::EightTires {
        price += 400.0;
    }
    match vehicle.autopilot.as_str() {
        "EAP" => price += 800.0,
        "FSD" => price += 1_800.0,
        _ => {}
    }
    if !vehicle.accident_free {
        price *= 0.85;
    }
    if vehicle.tax_type == TaxTreatment::Vat {
        // Company sellers quote net of VAT.
        price /= 1.19;
    }
    price.max(5_000.0)
}
