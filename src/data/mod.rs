//! Ledger cleaning rules and synthetic ledgers.

pub mod cleaning;
pub mod sample;

pub use cleaning::*;
pub use sample::*;
