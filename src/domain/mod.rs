//! Domain types used throughout the valuation pipeline.
//!
//! This module defines:
//!
//! - vehicle/auction vocabulary (`ModelFamily`, `TaxTreatment`, `TireStrategy`, `TrustTier`)
//! - the target configuration and ledger rows (`VehicleConfiguration`, `AuctionRecord`)
//! - calendar helpers for age and recency (`calendar`)

pub mod calendar;
pub mod types;

pub use calendar::*;
pub use types::*;
