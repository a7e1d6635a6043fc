//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from the cleaned auction ledger (CSV)
//! - passed by reference through the valuation engine (never mutated)
//! - exported to JSON alongside computed valuations

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::calendar::months_between;

/// Vehicle model family.
///
/// Rates in the distance scorer and price adjuster are selected per family:
/// `Model 3` has its own table, every other family uses the Model Y table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ModelFamily {
    #[serde(rename = "Model 3")]
    #[value(name = "model-3", alias = "m3")]
    Model3,
    #[serde(rename = "Model Y")]
    #[value(name = "model-y", alias = "my")]
    ModelY,
}

impl ModelFamily {
    /// Label as it appears in the auction ledger.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelFamily::Model3 => "Model 3",
            ModelFamily::ModelY => "Model Y",
        }
    }

    /// Lenient parse: `Model 3`, `model3`, `m3` (and the Y equivalents).
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "model3" | "m3" => Some(ModelFamily::Model3),
            "modely" | "my" => Some(ModelFamily::ModelY),
            _ => None,
        }
    }
}

/// Tax treatment of the sale price.
///
/// Margin-taxed (private seller, gross price) and VAT-deductible (company
/// seller, net price) listings are never mixed in one cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaxTreatment {
    Margin,
    Vat,
}

impl TaxTreatment {
    pub fn label(self) -> &'static str {
        match self {
            TaxTreatment::Margin => "margin",
            TaxTreatment::Vat => "vat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "margin" => Some(TaxTreatment::Margin),
            "vat" | "vat_deductible" => Some(TaxTreatment::Vat),
            _ => None,
        }
    }
}

/// Which tire bundle ships with the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum TireStrategy {
    /// Two full sets (summer + winter).
    #[serde(rename = "8_tires")]
    #[value(name = "8_tires")]
    EightTires,
    #[serde(rename = "4_summer")]
    #[value(name = "4_summer")]
    FourSummer,
    #[serde(rename = "4_winter")]
    #[value(name = "4_winter")]
    FourWinter,
    #[serde(rename = "4_all_season")]
    #[value(name = "4_all_season")]
    FourAllSeason,
    #[serde(rename = "unknown")]
    #[value(name = "unknown")]
    Unknown,
}

impl TireStrategy {
    pub fn label(self) -> &'static str {
        match self {
            TireStrategy::EightTires => "8_tires",
            TireStrategy::FourSummer => "4_summer",
            TireStrategy::FourWinter => "4_winter",
            TireStrategy::FourAllSeason => "4_all_season",
            TireStrategy::Unknown => "unknown",
        }
    }

    /// Unrecognized labels map to `Unknown` rather than failing the row.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "8_tires" => TireStrategy::EightTires,
            "4_summer" => TireStrategy::FourSummer,
            "4_winter" => TireStrategy::FourWinter,
            "4_all_season" => TireStrategy::FourAllSeason,
            _ => TireStrategy::Unknown,
        }
    }

    pub fn is_eight_tires(self) -> bool {
        self == TireStrategy::EightTires
    }
}

/// Reliability grade of the data source behind a ledger row.
///
/// Labels are matched exactly (`"Tier 2"`, `"Tier 3"`); anything else is kept
/// verbatim as `Other` and treated like the top tier by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrustTier {
    Tier1,
    Tier2,
    Tier3,
    Other(String),
}

impl TrustTier {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Tier 1" => TrustTier::Tier1,
            "Tier 2" => TrustTier::Tier2,
            "Tier 3" => TrustTier::Tier3,
            other => TrustTier::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TrustTier::Tier1 => "Tier 1",
            TrustTier::Tier2 => "Tier 2",
            TrustTier::Tier3 => "Tier 3",
            TrustTier::Other(label) => label,
        }
    }
}

impl From<String> for TrustTier {
    fn from(value: String) -> Self {
        TrustTier::from_label(&value)
    }
}

impl From<TrustTier> for String {
    fn from(value: TrustTier) -> Self {
        value.label().to_string()
    }
}

/// Outcome class derived from the raw auction status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionOutcome {
    SellerAccepted,
    SellerDeclined,
    Sold,
    Other,
}

impl AuctionOutcome {
    /// Substring match on the raw status, e.g. `closed_seller_accepted`.
    pub fn from_status(status: &str) -> Self {
        let status = status.to_ascii_lowercase();
        if status.contains("accepted") {
            AuctionOutcome::SellerAccepted
        } else if status.contains("declined") {
            AuctionOutcome::SellerDeclined
        } else if status.contains("sold") {
            AuctionOutcome::Sold
        } else {
            AuctionOutcome::Other
        }
    }

    /// Whether the auction reached a final bidding outcome.
    pub fn is_closed(self) -> bool {
        self != AuctionOutcome::Other
    }
}

/// A vehicle configuration: either the car being valued or the car behind a
/// historical auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfiguration {
    pub model: ModelFamily,
    /// Power-clustered variant code, e.g. `m3_lr`.
    pub variant: String,
    /// Post-refresh hardware generation.
    pub is_highland: bool,
    pub tax_type: TaxTreatment,
    pub accident_free: bool,
    /// Autopilot package label (`Standard`, `EAP`, `FSD`); compared verbatim.
    pub autopilot: String,
    pub tire_strategy: TireStrategy,
    pub has_heat_pump: bool,
    pub has_hitch: bool,
    pub mileage_km: u32,
    pub first_registration: NaiveDate,
}

impl VehicleConfiguration {
    /// Age in whole months as of `reference`, by calendar month fields.
    pub fn age_months(&self, reference: NaiveDate) -> u32 {
        months_between(self.first_registration, reference)
    }
}

/// One closed (or open) auction from the historical ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionRecord {
    pub auction_id: String,
    #[serde(flatten)]
    pub vehicle: VehicleConfiguration,
    pub age_at_auction_months: u32,
    pub end_time: DateTime<Utc>,
    /// Highest bid; `None` when the auction closed without one.
    pub final_price: Option<f64>,
    /// Raw status string from the source platform.
    pub status: String,
    pub bid_count: u32,
    pub trust_tier: TrustTier,
}

impl AuctionRecord {
    pub fn outcome(&self) -> AuctionOutcome {
        AuctionOutcome::from_status(&self.status)
    }

    /// The final price if it is usable for valuation (finite and > 0).
    pub fn sale_price(&self) -> Option<f64> {
        self.final_price.filter(|p| p.is_finite() && *p > 0.0)
    }
}
