//! Comparable-sales valuation engine.
//!
//! Layers, bottom up:
//!
//! - `weights`: the fixed rate tables
//! - `scorer`: target/comparable distance with a per-factor breakdown
//! - `adjuster`: comparable price normalized to the target's mileage and hitch
//! - `cohort`: hard filters, kept as separate predicates
//! - `engine`: k-NN selection, IDW weighting, estimate and range
//! - `historical`, `insights`, `backtest`: leakage-free variants built on top

pub mod adjuster;
pub mod backtest;
pub mod cohort;
pub mod engine;
pub mod historical;
pub mod insights;
pub mod payout;
pub mod result;
pub mod scorer;
pub mod target;
pub mod weights;

#[cfg(test)]
pub(crate) mod test_support;

pub use adjuster::*;
pub use backtest::*;
pub use cohort::*;
pub use engine::*;
pub use historical::*;
pub use insights::*;
pub use payout::*;
pub use result::*;
pub use scorer::*;
pub use target::*;
pub use weights::*;
