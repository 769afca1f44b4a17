use async_trait::async_trait;
use tracing::info;

use super::models::{
    FundWalletRequest, FundWalletResponse, PaymentVerification, Transaction, Wallet,
    WalletResponse,
};
use crate::common::{safe_email_log, ApiClient, ApiError, ListQuery, Paginated};

/// Wallet REST surface; the flow only talks to the server through this
#[async_trait]
pub trait WalletBackend: Send + Sync {
    async fn balance(&self) -> Result<Wallet, ApiError>;
    async fn fund(&self, request: &FundWalletRequest) -> Result<FundWalletResponse, ApiError>;
    async fn verify(&self, reference: &str) -> Result<PaymentVerification, ApiError>;
    async fn transactions(&self, query: &ListQuery) -> Result<Paginated<Transaction>, ApiError>;
}

#[derive(Clone)]
pub struct WalletService {
    api: ApiClient,
}

impl WalletService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WalletBackend for WalletService {
    async fn balance(&self) -> Result<Wallet, ApiError> {
        let response: WalletResponse = self.api.get("/wallet/balance").await?;
        Ok(response.into_wallet())
    }

    async fn fund(&self, request: &FundWalletRequest) -> Result<FundWalletResponse, ApiError> {
        info!(
            email = %safe_email_log(&request.email),
            amount = request.amount,
            "Initiating wallet funding"
        );
        self.api.post("/wallet/fund", request).await
    }

    async fn verify(&self, reference: &str) -> Result<PaymentVerification, ApiError> {
        let path = format!("/wallet/verify/{}", urlencoding::encode(reference));
        self.api.get(&path).await
    }

    async fn transactions(&self, query: &ListQuery) -> Result<Paginated<Transaction>, ApiError> {
        self.api.get(&query.append_to_path("/transactions")).await
    }
}
