use reqwest::Url;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::fees::{funding_breakdown, validate_funding_amount, FeeBreakdown};
use super::models::{FundWalletRequest, Transaction, Wallet};
use super::service::WalletBackend;
use super::validators::FundWalletValidator;
use super::verification::{
    payment_reference, scrub_payment_params, PaymentVerifier, VerificationState,
};
use crate::common::{ApiError, ListQuery, Navigator, Paginated, Validator};

const VERIFICATION_FAILED: &str = "Payment verification failed";

/// What a location check did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified { reference: String },
    /// `message` is what the user should be shown
    Failed { reference: String, message: String },
}

#[derive(Debug, Default)]
struct WalletSnapshot {
    wallet: Option<Wallet>,
    transactions: Option<Paginated<Transaction>>,
}

/// Wallet screen logic: fee preview, funding hand-off and verification on return
pub struct WalletFlow {
    backend: Arc<dyn WalletBackend>,
    navigator: Arc<dyn Navigator>,
    verifier: PaymentVerifier,
    snapshot: RwLock<WalletSnapshot>,
}

impl WalletFlow {
    pub fn new(backend: Arc<dyn WalletBackend>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            backend,
            navigator,
            verifier: PaymentVerifier::new(),
            snapshot: RwLock::new(WalletSnapshot::default()),
        }
    }

    pub fn fee_preview(&self, amount: f64) -> FeeBreakdown {
        funding_breakdown(amount)
    }

    /// Submit gate: amount at or above the minimum and nothing being verified
    pub fn can_submit(&self, amount: f64) -> bool {
        validate_funding_amount(amount).is_ok() && !self.verifier.is_in_flight()
    }

    /// Starts a funding payment and hands the user over to the provider.
    /// Nothing is sent when the request fails local checks.
    pub async fn initiate_funding(&self, email: &str, amount: f64) -> Result<Url, ApiError> {
        let request = FundWalletRequest {
            email: email.trim().to_string(),
            amount,
        };
        FundWalletValidator.validate(&request).into_result()?;

        if self.verifier.is_in_flight() {
            return Err(ApiError::Conflict(
                "A payment is still being verified".to_string(),
            ));
        }

        let response = self.backend.fund(&request).await?;
        let url = Url::parse(&response.authorization_url).map_err(|e| {
            error!(error = %e, "Payment provider returned an unusable URL");
            ApiError::Navigation(format!("invalid authorization URL: {}", e))
        })?;

        info!(reference = ?response.reference, "Redirecting to payment provider");
        self.navigator.navigate_external(url.clone());
        Ok(url)
    }

    /// Location hook, run on every render of the wallet view.
    ///
    /// Returns `None` when there was nothing to do: no payment reference in
    /// the URL, the reference was already handled, or another verification
    /// holds the guard.
    pub async fn on_location(&self) -> Option<VerificationOutcome> {
        let current = self.navigator.current_url();
        let reference = match payment_reference(&current) {
            Some(reference) => reference,
            None => {
                self.verifier.force_reset();
                return None;
            }
        };

        if !self.verifier.try_begin(&reference) {
            return None;
        }
        info!(reference = %reference, "Verifying payment");

        let failure = match self.backend.verify(&reference).await {
            Ok(result) if result.is_successful() => None,
            Ok(result) => Some(
                result
                    .message
                    .unwrap_or_else(|| VERIFICATION_FAILED.to_string()),
            ),
            Err(e) => Some(e.user_message()),
        };

        match failure {
            None => {
                let first_page = ListQuery::default();
                let (wallet, transactions) = tokio::join!(
                    self.backend.balance(),
                    self.backend.transactions(&first_page)
                );
                self.store_refetch(wallet, transactions).await;
                self.scrub_location();
                self.verifier.finish(&reference, Ok(()));
                info!(reference = %reference, "Payment verified");
                Some(VerificationOutcome::Verified { reference })
            }
            Some(message) => {
                self.scrub_location();
                self.verifier.finish(&reference, Err(message.clone()));
                warn!(reference = %reference, error = %message, "Payment verification failed");
                Some(VerificationOutcome::Failed { reference, message })
            }
        }
    }

    /// Refetches the balance and the first page of transactions
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let first_page = ListQuery::default();
        let (wallet, transactions) = tokio::join!(
            self.backend.balance(),
            self.backend.transactions(&first_page)
        );
        let wallet = wallet?;
        let transactions = transactions?;

        let mut snapshot = self.snapshot.write().await;
        snapshot.wallet = Some(wallet);
        snapshot.transactions = Some(transactions);
        Ok(())
    }

    /// Loads another page of the history into the snapshot
    pub async fn load_transactions(
        &self,
        query: &ListQuery,
    ) -> Result<Paginated<Transaction>, ApiError> {
        let page = self.backend.transactions(query).await?;
        self.snapshot.write().await.transactions = Some(page.clone());
        Ok(page)
    }

    pub async fn wallet(&self) -> Option<Wallet> {
        self.snapshot.read().await.wallet.clone()
    }

    pub async fn transactions(&self) -> Option<Paginated<Transaction>> {
        self.snapshot.read().await.transactions.clone()
    }

    pub fn state(&self) -> VerificationState {
        self.verifier.state()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifier.is_in_flight()
    }

    pub async fn reset(&self) {
        *self.snapshot.write().await = WalletSnapshot::default();
    }

    // Partial results still land; a failed half keeps its previous value
    async fn store_refetch(
        &self,
        wallet: Result<Wallet, ApiError>,
        transactions: Result<Paginated<Transaction>, ApiError>,
    ) {
        let mut snapshot = self.snapshot.write().await;
        match wallet {
            Ok(wallet) => snapshot.wallet = Some(wallet),
            Err(e) => warn!(error = %e, "Balance refetch failed"),
        }
        match transactions {
            Ok(page) => snapshot.transactions = Some(page),
            Err(e) => warn!(error = %e, "Transaction refetch failed"),
        }
    }

    fn scrub_location(&self) {
        let current = self.navigator.current_url();
        let clean = scrub_payment_params(&current);
        if clean != current {
            self.navigator.replace_url(clean);
        }
    }
}
