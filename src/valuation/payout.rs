use serde::{Deserialize, Serialize};

use crate::valuation::result::Valuation;

/// What a dealer would offer after its fixed deduction margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutQuote {
    pub estimated_value: i64,
    pub deduction_margin: f64,
    /// `round(estimated_value - deduction_margin)`, never below zero.
    pub payout: i64,
}

impl PayoutQuote {
    pub fn from_estimate(estimated_value: i64, deduction_margin: f64) -> Self {
        let payout = (estimated_value as f64 - deduction_margin).round().max(0.0) as i64;
        Self {
            estimated_value,
            deduction_margin,
            payout,
        }
    }

    pub fn for_valuation(valuation: &Valuation, deduction_margin: f64) -> Self {
        Self::from_estimate(valuation.estimated_value, deduction_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_subtracts_margin_and_rounds() {
        let quote = PayoutQuote::from_estimate(30_000, 1_499.6);
        assert_eq!(quote.payout, 28_500);
        assert_eq!(PayoutQuote::from_estimate(30_000, 0.0).payout, 30_000);
    }

    #[test]
    fn payout_never_goes_negative() {
        assert_eq!(PayoutQuote::from_estimate(500, 2_000.0).payout, 0);
    }
}
