//! # Wallet Module
//!
//! Organisation wallet: balance, transaction history and funding through an
//! external payment provider, including verification when the user returns.

pub mod fees;
pub mod flow;
pub mod models;
pub mod service;
pub mod validators;
pub mod verification;

#[cfg(test)]
mod tests;

pub use fees::{funding_breakdown, validate_funding_amount, FeeBreakdown, MIN_FUNDING_AMOUNT};
pub use flow::{VerificationOutcome, WalletFlow};
pub use models::{FundWalletRequest, FundWalletResponse, Transaction, Wallet};
pub use service::{WalletBackend, WalletService};
pub use verification::{payment_reference, scrub_payment_params, PaymentVerifier, VerificationState};
