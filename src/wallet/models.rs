use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wallet Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub balance: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Funds reserved against open requests
    #[serde(default)]
    pub holds: Vec<WalletHold>,
}

fn default_currency() -> String {
    "NGN".to_string()
}

impl Wallet {
    pub fn held(&self) -> f64 {
        self.holds.iter().map(|h| h.amount).sum()
    }

    pub fn available(&self) -> f64 {
        (self.balance - self.held()).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletHold {
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, alias = "request")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WalletResponse {
    Wrapped { wallet: Wallet },
    Plain(Wallet),
}

impl WalletResponse {
    pub(crate) fn into_wallet(self) -> Wallet {
        match self {
            WalletResponse::Wrapped { wallet } => wallet,
            WalletResponse::Plain(wallet) => wallet,
        }
    }
}

// ============================================================================
// Transaction Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    Hold,
    Release,
    Refund,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    #[serde(alias = "successful", alias = "completed")]
    Success,
    Failed,
    Reversed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(default)]
    pub fee: f64,
    pub status: TransactionStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Funding & Verification
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundWalletRequest {
    pub email: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundWalletResponse {
    #[serde(alias = "authorization_url")]
    pub authorization_url: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, alias = "access_code")]
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentVerification {
    /// A 2xx answer counts as success unless it names a failing status
    pub fn is_successful(&self) -> bool {
        match self.status.as_deref().map(str::to_ascii_lowercase) {
            None => true,
            Some(status) => matches!(status.as_str(), "success" | "successful" | "completed"),
        }
    }
}
