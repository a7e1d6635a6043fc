//! `ev-comps` library crate.
//!
//! Glass-box comparable-sales valuation for used Model 3 / Model Y cars: a
//! target configuration is priced from the nearest historical auctions, with
//! every penalty, price adjustment and weight exposed in the result.
//!
//! The binary (`comps`) is a thin wrapper around this library so that:
//!
//! - the valuation core is testable without spawning processes
//! - the engine can be embedded behind other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod telemetry;
pub mod valuation;
