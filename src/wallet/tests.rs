//! Tests for wallet module
//!
//! These tests verify:
//! - Funding is rejected locally below the minimum amount
//! - A payment reference is verified exactly once, however often the view re-renders
//! - Success refetches the wallet and scrubs the URL; failure scrubs and reports
//! - A stuck guard is released once the reference leaves the URL
//! - REST response shapes

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        extract::{Path, Query},
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::super::flow::{VerificationOutcome, WalletFlow};
    use super::super::models::*;
    use super::super::service::{WalletBackend, WalletService};
    use super::super::verification::VerificationState;
    use crate::common::testing::{signed_in_session, spawn_api, test_client};
    use crate::common::{ApiError, ListQuery, MemoryNavigator, Navigator, Paginated};

    #[derive(Default)]
    struct FakeWallet {
        fail_verify: bool,
        verify_delay: Duration,
        fund_calls: AtomicUsize,
        verify_calls: Mutex<Vec<String>>,
        balance_calls: AtomicUsize,
        transaction_calls: AtomicUsize,
    }

    impl FakeWallet {
        fn verify_count(&self) -> usize {
            self.verify_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl WalletBackend for FakeWallet {
        async fn balance(&self) -> Result<Wallet, ApiError> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Wallet {
                balance: 4_965.0,
                currency: "NGN".to_string(),
                holds: Vec::new(),
            })
        }

        async fn fund(&self, request: &FundWalletRequest) -> Result<FundWalletResponse, ApiError> {
            self.fund_calls.fetch_add(1, Ordering::SeqCst);
            Ok(FundWalletResponse {
                authorization_url: format!("https://checkout.pay.test/pay/{}", request.amount),
                reference: Some("ref-1".to_string()),
                access_code: None,
            })
        }

        async fn verify(&self, reference: &str) -> Result<PaymentVerification, ApiError> {
            self.verify_calls.lock().unwrap().push(reference.to_string());
            tokio::time::sleep(self.verify_delay).await;
            if self.fail_verify {
                Err(ApiError::BadRequest("Transaction was abandoned".to_string()))
            } else {
                Ok(PaymentVerification {
                    status: Some("success".to_string()),
                    reference: Some(reference.to_string()),
                    ..Default::default()
                })
            }
        }

        async fn transactions(&self, _query: &ListQuery) -> Result<Paginated<Transaction>, ApiError> {
            self.transaction_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Paginated {
                items: vec![Transaction {
                    id: "t1".to_string(),
                    reference: Some("abc123".to_string()),
                    transaction_type: TransactionType::Credit,
                    amount: 5_000.0,
                    fee: 35.0,
                    status: TransactionStatus::Success,
                    description: None,
                    created_at: Utc::now(),
                }],
                total: 1,
                page: 1,
                limit: 10,
                total_pages: 1,
            })
        }
    }

    fn flow_at(url: &str, backend: Arc<FakeWallet>) -> (Arc<WalletFlow>, Arc<MemoryNavigator>) {
        let navigator = Arc::new(MemoryNavigator::parse(url).unwrap());
        let flow = Arc::new(WalletFlow::new(backend, navigator.clone()));
        (flow, navigator)
    }

    // ========================================================================
    // Funding
    // ========================================================================

    #[tokio::test]
    async fn test_below_minimum_makes_no_call() {
        let backend = Arc::new(FakeWallet::default());
        let (flow, navigator) = flow_at("http://localhost:3000/wallet", backend.clone());

        assert!(!flow.can_submit(9.99));
        let err = flow.initiate_funding("finance@acme.io", 9.99).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));

        assert_eq!(backend.fund_calls.load(Ordering::SeqCst), 0);
        assert!(navigator.external_navigations().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_makes_no_call() {
        let backend = Arc::new(FakeWallet::default());
        let (flow, _) = flow_at("http://localhost:3000/wallet", backend.clone());

        assert!(flow.initiate_funding("not-an-email", 500.0).await.is_err());
        assert_eq!(backend.fund_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_funding_navigates_to_provider() {
        let backend = Arc::new(FakeWallet::default());
        let (flow, navigator) = flow_at("http://localhost:3000/wallet", backend.clone());

        assert!(flow.can_submit(1000.0));
        assert_eq!(flow.fee_preview(1000.0).net, 965.0);

        let url = flow.initiate_funding("finance@acme.io", 1000.0).await.unwrap();
        assert_eq!(url.host_str(), Some("checkout.pay.test"));
        assert_eq!(navigator.last_external(), Some(url));
        assert_eq!(backend.fund_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_blocked_while_verifying() {
        let backend = Arc::new(FakeWallet {
            verify_delay: Duration::from_millis(200),
            ..Default::default()
        });
        let (flow, _) = flow_at("http://localhost:3000/wallet?reference=abc123", backend.clone());

        let running = tokio::spawn({
            let flow = flow.clone();
            async move { flow.on_location().await }
        });
        while !flow.is_verifying() {
            tokio::task::yield_now().await;
        }

        assert!(!flow.can_submit(1000.0));
        assert!(matches!(
            flow.initiate_funding("finance@acme.io", 1000.0).await,
            Err(ApiError::Conflict(_))
        ));
        assert_eq!(backend.fund_calls.load(Ordering::SeqCst), 0);

        running.await.unwrap();
        assert!(flow.can_submit(1000.0));
    }

    // ========================================================================
    // Verification
    // ========================================================================

    #[tokio::test]
    async fn test_reference_verified_exactly_once_across_renders() {
        let backend = Arc::new(FakeWallet {
            verify_delay: Duration::from_millis(100),
            ..Default::default()
        });
        let (flow, navigator) = flow_at(
            "http://localhost:3000/wallet?reference=abc123&tab=history",
            backend.clone(),
        );

        let renders: Vec<_> = (0..5)
            .map(|_| {
                let flow = flow.clone();
                tokio::spawn(async move { flow.on_location().await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for render in renders {
            if let Some(outcome) = render.await.unwrap() {
                outcomes.push(outcome);
            }
        }

        assert_eq!(backend.verify_count(), 1);
        assert_eq!(
            outcomes,
            vec![VerificationOutcome::Verified {
                reference: "abc123".to_string()
            }]
        );
        assert_eq!(
            navigator.current_url().as_str(),
            "http://localhost:3000/wallet?tab=history"
        );
    }

    #[tokio::test]
    async fn test_success_refetches_and_does_not_retrigger() {
        let backend = Arc::new(FakeWallet::default());
        let (flow, navigator) = flow_at("http://localhost:3000/wallet?trxref=abc123", backend.clone());

        let outcome = flow.on_location().await;
        assert!(matches!(outcome, Some(VerificationOutcome::Verified { .. })));
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.transaction_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.wallet().await.unwrap().balance, 4_965.0);
        assert_eq!(flow.transactions().await.unwrap().items.len(), 1);
        assert!(!flow.is_verifying());
        assert_eq!(
            flow.state(),
            VerificationState::Succeeded {
                reference: "abc123".to_string()
            }
        );

        // Reload without the parameter
        assert_eq!(navigator.current_url().query(), None);
        assert!(flow.on_location().await.is_none());

        // Someone pastes the old link back in
        navigator.replace_url(
            reqwest::Url::parse("http://localhost:3000/wallet?reference=abc123").unwrap(),
        );
        assert!(flow.on_location().await.is_none());
        assert_eq!(backend.verify_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_scrubs_and_reports() {
        let backend = Arc::new(FakeWallet {
            fail_verify: true,
            ..Default::default()
        });
        let (flow, navigator) = flow_at("http://localhost:3000/wallet?reference=bad1", backend.clone());

        let outcome = flow.on_location().await;
        assert_eq!(
            outcome,
            Some(VerificationOutcome::Failed {
                reference: "bad1".to_string(),
                message: "Transaction was abandoned".to_string()
            })
        );
        assert_eq!(navigator.current_url().as_str(), "http://localhost:3000/wallet");
        assert!(!flow.is_verifying());
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 0);

        // No automatic retry
        assert!(flow.on_location().await.is_none());
        assert_eq!(backend.verify_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reference_retried_on_fresh_redirect() {
        let backend = Arc::new(FakeWallet {
            fail_verify: true,
            ..Default::default()
        });
        let return_url = "http://localhost:3000/wallet?reference=bad1";
        let (flow, navigator) = flow_at(return_url, backend.clone());

        assert!(matches!(
            flow.on_location().await,
            Some(VerificationOutcome::Failed { .. })
        ));
        assert_eq!(backend.verify_count(), 1);

        // The user comes back through the provider's redirect again
        navigator.replace_url(reqwest::Url::parse(return_url).unwrap());
        assert!(matches!(
            flow.on_location().await,
            Some(VerificationOutcome::Failed { ref reference, .. }) if reference == "bad1"
        ));
        assert_eq!(backend.verify_count(), 2);
        assert_eq!(navigator.current_url().as_str(), "http://localhost:3000/wallet");
        assert!(!flow.is_verifying());
    }

    #[tokio::test]
    async fn test_vanished_reference_releases_guard() {
        let backend = Arc::new(FakeWallet {
            verify_delay: Duration::from_secs(30),
            ..Default::default()
        });
        let (flow, navigator) = flow_at("http://localhost:3000/wallet?reference=slow", backend.clone());

        let stuck = tokio::spawn({
            let flow = flow.clone();
            async move { flow.on_location().await }
        });
        while !flow.is_verifying() {
            tokio::task::yield_now().await;
        }

        navigator.replace_url(reqwest::Url::parse("http://localhost:3000/wallet").unwrap());
        assert!(flow.on_location().await.is_none());
        assert!(!flow.is_verifying());
        assert_eq!(flow.state(), VerificationState::Idle);

        stuck.abort();
    }

    // ========================================================================
    // REST
    // ========================================================================

    #[tokio::test]
    async fn test_wallet_service_endpoints() {
        let app = Router::new()
            .route(
                "/wallet/balance",
                get(|| async {
                    Json(json!({"data": {"wallet": {
                        "balance": 12000.5,
                        "holds": [{"amount": 2000, "reason": "Request r1", "requestId": "r1"}]
                    }}}))
                }),
            )
            .route(
                "/wallet/fund",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"data": {
                        "authorization_url": "https://checkout.pay.test/x",
                        "reference": format!("ref-{}", body["amount"])
                    }}))
                }),
            )
            .route(
                "/wallet/verify/:reference",
                get(|Path(reference): Path<String>| async move {
                    Json(json!({"data": {"status": "success", "reference": reference}}))
                }),
            )
            .route(
                "/transactions",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"data": {
                        "transactions": [{
                            "_id": "t9",
                            "type": "debit",
                            "amount": 2000,
                            "status": "completed",
                            "createdAt": "2026-01-05T10:00:00Z"
                        }],
                        "total": 21,
                        "page": params.get("page").and_then(|p| p.parse::<u32>().ok()).unwrap_or(1),
                        "limit": 10
                    }}))
                }),
            );
        let base = spawn_api(app).await;
        let (client, _) = test_client(&base, signed_in_session("u1").await);
        let service = WalletService::new(client);

        let wallet = service.balance().await.unwrap();
        assert_eq!(wallet.currency, "NGN");
        assert_eq!(wallet.held(), 2000.0);
        assert_eq!(wallet.available(), 10000.5);

        let funded = service
            .fund(&FundWalletRequest {
                email: "finance@acme.io".to_string(),
                amount: 500.0,
            })
            .await
            .unwrap();
        assert_eq!(funded.authorization_url, "https://checkout.pay.test/x");
        assert_eq!(funded.reference.as_deref(), Some("ref-500.0"));

        let verified = service.verify("abc 123").await.unwrap();
        assert!(verified.is_successful());
        assert_eq!(verified.reference.as_deref(), Some("abc 123"));

        let page = service
            .transactions(&ListQuery::default().page(2))
            .await
            .unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].status, TransactionStatus::Success);
        assert_eq!(page.items[0].transaction_type, TransactionType::Debit);
    }

    #[test]
    fn test_failed_status_is_not_success() {
        let failed: PaymentVerification =
            serde_json::from_value(json!({"status": "failed", "message": "Declined"})).unwrap();
        assert!(!failed.is_successful());
        assert!(PaymentVerification::default().is_successful());
    }
}
