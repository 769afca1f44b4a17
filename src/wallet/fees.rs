//! Funding fee preview. Display only; the server computes the real charge.

use serde::Serialize;

use crate::common::ApiError;

pub const FUNDING_FEE_RATE: f64 = 0.035;
pub const FUNDING_FEE_CAP: f64 = 2000.0;
pub const MIN_FUNDING_AMOUNT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub amount: f64,
    pub charge: f64,
    /// What lands in the wallet
    pub net: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn funding_charge(amount: f64) -> f64 {
    round_cents((amount * FUNDING_FEE_RATE).min(FUNDING_FEE_CAP))
}

pub fn funding_breakdown(amount: f64) -> FeeBreakdown {
    let charge = funding_charge(amount);
    FeeBreakdown {
        amount,
        charge,
        net: round_cents(amount - charge),
    }
}

pub fn validate_funding_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() {
        return Err(ApiError::invalid("amount", "Enter a valid amount"));
    }
    if amount < MIN_FUNDING_AMOUNT {
        return Err(ApiError::invalid(
            "amount",
            &format!("Minimum funding amount is {}", MIN_FUNDING_AMOUNT),
        ));
    }
    Ok(())
}
