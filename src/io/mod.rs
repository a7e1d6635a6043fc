//! Input/output helpers.
//!
//! - ledger CSV ingest + validation (`ingest`)
//! - valuation/backtest/ledger exports (`export`)
//! - weight table JSON read/write (`weights`)

pub mod export;
pub mod ingest;
pub mod weights;

pub use export::*;
pub use ingest::*;
pub use weights::*;
