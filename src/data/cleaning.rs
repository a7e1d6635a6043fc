//! Derivations used to turn raw auction listings into ledger rows.
//!
//! These are the rules the cleaned ledger was produced with. The synthetic
//! generator reuses them so generated rows look like cleaned ones.

use crate::domain::{AuctionOutcome, ModelFamily, TireStrategy, TrustTier};

/// Power-clustered variant code for a motor output in kW.
pub fn variant_from_power(model: ModelFamily, kw: f64) -> &'static str {
    if !kw.is_finite() {
        return "unknown";
    }
    match model {
        ModelFamily::Model3 => {
            if (208.0..=239.0).contains(&kw) {
                "m3_sr"
            } else if (324.0..=366.0).contains(&kw) {
                "m3_lr"
            } else if kw >= 377.0 {
                "m3_p"
            } else {
                "unknown"
            }
        }
        ModelFamily::ModelY => {
            if (220.0..=255.0).contains(&kw) {
                "my_sr"
            } else if (370.0..=385.0).contains(&kw) {
                "my_lr"
            } else if kw >= 390.0 {
                "my_p"
            } else {
                "unknown"
            }
        }
    }
}

/// Post-refresh Model 3: named as such, or registered 2024+ with a
/// refresh-only motor output.
pub fn is_highland(model: ModelFamily, variant_label: &str, registration_year: i32, kw: f64) -> bool {
    if variant_label.contains("Highland") {
        return true;
    }
    model == ModelFamily::Model3 && registration_year >= 2024 && (kw == 235.0 || kw == 461.0)
}

/// Reliability of a row's price, judged from how the auction ended.
pub fn trust_tier_for(status: &str, bid_count: u32) -> TrustTier {
    match AuctionOutcome::from_status(status) {
        AuctionOutcome::Sold | AuctionOutcome::SellerAccepted => TrustTier::Tier1,
        AuctionOutcome::SellerDeclined if bid_count > 1 => TrustTier::Tier2,
        _ => TrustTier::Tier3,
    }
}

/// Canonical autopilot label from the listing's free-text package name.
pub fn normalize_autopilot(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some("Full self driving") => "FSD".to_string(),
        Some("Enhanced") => "EAP".to_string(),
        Some("") | None => "Standard".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Tire bundle from the listed tire sets (one entry per set, by type).
pub fn tire_strategy_for(sets: &[&str]) -> TireStrategy {
    match sets {
        [_, _] => TireStrategy::EightTires,
        [kind] => {
            let kind = kind.to_ascii_lowercase();
            if kind.contains("summer") {
                TireStrategy::FourSummer
            } else if kind.contains("winter") {
                TireStrategy::FourWinter
            } else if kind.contains("season") {
                TireStrategy::FourAllSeason
            } else {
                TireStrategy::Unknown
            }
        }
        _ => TireStrategy::Unknown,
    }
}

/// Human-readable name of a variant code, e.g. `m3_lr` -> `Model 3 Long Range`.
pub fn variant_display_name(code: &str) -> Option<&'static str> {
    match code {
        "m3_sr" => Some("Model 3 Standard Range"),
        "m3_lr" => Some("Model 3 Long Range"),
        "m3_p" => Some("Model 3 Performance"),
        "my_sr" => Some("Model Y Standard Range"),
        "my_lr" => Some("Model Y Long Range"),
        "my_p" => Some("Model Y Performance"),
        _ => None,
    }
}
