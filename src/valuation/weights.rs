//! Fixed rate tables for the distance scorer, the price adjuster and the
//! inverse-distance weighting.
//!
//! The values were tuned offline against the auction ledger and are treated as
//! configuration: the engine reads them, it never fits them. `Default` gives the
//! production table; a JSON file with the same shape can override any subset
//! (see `io::weights`).

use serde::{Deserialize, Serialize};

use crate::domain::ModelFamily;

/// Per-factor distance penalty rates and constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceWeights {
    pub m3_mileage_per_km: f64,
    pub my_mileage_per_km: f64,
    pub m3_age_per_month: f64,
    pub my_age_per_month: f64,
    pub recency_per_day: f64,
    /// Target has the 8-tire bundle, comparable does not.
    pub tire_8_vs_4: f64,
    /// Comparable has the 8-tire bundle, target does not.
    pub tire_4_vs_8: f64,
    /// Both are 4-tire sets of a different kind.
    pub tire_type_mismatch: f64,
    pub heat_pump_mismatch: f64,
    pub autopilot_mismatch: f64,
    pub trust_tier_2: f64,
    pub trust_tier_3: f64,
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self {
            m3_mileage_per_km: 0.0020,
            my_mileage_per_km: 0.0025,
            m3_age_per_month: 12.6,
            my_age_per_month: 17.1,
            recency_per_day: 0.49,
            tire_8_vs_4: 32.0,
            tire_4_vs_8: 22.0,
            tire_type_mismatch: 15.0,
            heat_pump_mismatch: 34.0,
            autopilot_mismatch: 44.0,
            trust_tier_2: 20.0,
            trust_tier_3: 123.0,
        }
    }
}

impl DistanceWeights {
    pub fn mileage_rate(&self, model: ModelFamily) -> f64 {
        match model {
            ModelFamily::Model3 => self.m3_mileage_per_km,
            ModelFamily::ModelY => self.my_mileage_per_km,
        }
    }

    pub fn age_rate(&self, model: ModelFamily) -> f64 {
        match model {
            ModelFamily::Model3 => self.m3_age_per_month,
            ModelFamily::ModelY => self.my_age_per_month,
        }
    }

    fn values(&self) -> [(&'static str, f64); 12] {
        [
            ("m3_mileage_per_km", self.m3_mileage_per_km),
            ("my_mileage_per_km", self.my_mileage_per_km),
            ("m3_age_per_month", self.m3_age_per_month),
            ("my_age_per_month", self.my_age_per_month),
            ("recency_per_day", self.recency_per_day),
            ("tire_8_vs_4", self.tire_8_vs_4),
            ("tire_4_vs_8", self.tire_4_vs_8),
            ("tire_type_mismatch", self.tire_type_mismatch),
            ("heat_pump_mismatch", self.heat_pump_mismatch),
            ("autopilot_mismatch", self.autopilot_mismatch),
            ("trust_tier_2", self.trust_tier_2),
            ("trust_tier_3", self.trust_tier_3),
        ]
    }
}

/// Price normalization rates (currency units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentRates {
    pub m3_mileage_per_km: f64,
    pub my_mileage_per_km: f64,
    pub hitch: f64,
}

impl Default for AdjustmentRates {
    fn default() -> Self {
        Self {
            m3_mileage_per_km: 0.05,
            my_mileage_per_km: 0.08,
            hitch: 250.0,
        }
    }
}

impl AdjustmentRates {
    pub fn mileage_rate(&self, model: ModelFamily) -> f64 {
        match model {
            ModelFamily::Model3 => self.m3_mileage_per_km,
            ModelFamily::ModelY => self.my_mileage_per_km,
        }
    }
}

/// Complete configuration for one valuation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationWeights {
    pub distance: DistanceWeights,
    pub adjustments: AdjustmentRates,
    /// Exponent `p` in `1 / (d + ε)^p`.
    pub idw_power: f64,
    /// Guards the IDW weight when a comparable scores exactly 0.
    pub idw_epsilon: f64,
    pub k_neighbors: usize,
}

impl Default for ValuationWeights {
    fn default() -> Self {
        Self {
            distance: DistanceWeights::default(),
            adjustments: AdjustmentRates::default(),
            idw_power: 2.8,
            idw_epsilon: 1e-6,
            k_neighbors: 3,
        }
    }
}

impl ValuationWeights {
    /// Check the invariants the engine relies on.
    ///
    /// Penalty rates must be finite and non-negative (so distances stay
    /// non-negative), the IDW exponent and epsilon strictly positive, `k >= 1`.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.distance.values() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("distance.{name} must be finite and >= 0 (got {value})."));
            }
        }

        let adj = &self.adjustments;
        for (name, value) in [
            ("m3_mileage_per_km", adj.m3_mileage_per_km),
            ("my_mileage_per_km", adj.my_mileage_per_km),
            ("hitch", adj.hitch),
        ] {
            if !value.is_finite() {
                return Err(format!("adjustments.{name} must be finite (got {value})."));
            }
        }

        if !(self.idw_power.is_finite() && self.idw_power > 0.0) {
            return Err(format!("idw_power must be finite and > 0 (got {}).", self.idw_power));
        }
        if !(self.idw_epsilon.is_finite() && self.idw_epsilon > 0.0) {
            return Err(format!(
                "idw_epsilon must be finite and > 0 (got {}).",
                self.idw_epsilon
            ));
        }
        if self.k_neighbors == 0 {
            return Err("k_neighbors must be >= 1.".to_string());
        }
        Ok(())
    }

    /// Raw inverse-distance weight for a comparable at `distance`.
    pub fn idw_weight(&self, distance: f64) -> f64 {
        1.0 / (distance + self.idw_epsilon).powf(self.idw_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ValuationWeights::default().validate().is_ok());
    }

    #[test]
    fn rates_are_selected_by_model_family() {
        let w = ValuationWeights::default();
        assert_eq!(w.distance.mileage_rate(ModelFamily::Model3), 0.0020);
        assert_eq!(w.distance.mileage_rate(ModelFamily::ModelY), 0.0025);
        assert_eq!(w.distance.age_rate(ModelFamily::Model3), 12.6);
        assert_eq!(w.distance.age_rate(ModelFamily::ModelY), 17.1);
        assert_eq!(w.adjustments.mileage_rate(ModelFamily::Model3), 0.05);
        assert_eq!(w.adjustments.mileage_rate(ModelFamily::ModelY), 0.08);
    }

    #[test]
    fn validate_rejects_negative_penalty_and_zero_k() {
        let mut w = ValuationWeights::default();
        w.distance.heat_pump_mismatch = -1.0;
        assert!(w.validate().unwrap_err().contains("heat_pump_mismatch"));

        let mut w = ValuationWeights::default();
        w.k_neighbors = 0;
        assert!(w.validate().is_err());

        let mut w = ValuationWeights::default();
        w.idw_power = f64::NAN;
        assert!(w.validate().is_err());
    }

    #[test]
    fn idw_weight_prefers_closer_comparables() {
        let w = ValuationWeights::default();
        assert!(w.idw_weight(10.0) > w.idw_weight(20.0));
        // Zero distance stays finite thanks to epsilon.
        assert!(w.idw_weight(0.0).is_finite());
        let expected = 1.0 / 10.000001_f64.powf(2.8);
        assert!((w.idw_weight(10.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn partial_json_overrides_keep_defaults() {
        let w: ValuationWeights =
            serde_json::from_str(r#"{"k_neighbors": 5, "distance": {"recency_per_day": 0.1}}"#).unwrap();
        assert_eq!(w.k_neighbors, 5);
        assert_eq!(w.distance.recency_per_day, 0.1);
        assert_eq!(w.distance.trust_tier_3, 123.0);
        assert_eq!(w.idw_power, 2.8);
    }
}
