//! Tests for requests module
//!
//! These tests verify:
//! - Request and candidate-decision validation
//! - List filters travel as query parameters, defaults omitted
//! - Candidate accept/reject/hire endpoints and bodies

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, Query, State},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::super::models::*;
    use super::super::validators::*;
    use super::super::RequestService;
    use crate::common::testing::{signed_in_session, spawn_api, test_client};
    use crate::common::{ApiError, ListQuery, Validator};

    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    fn request_json(id: &str) -> Value {
        json!({
            "_id": id,
            "title": "Backend Engineer",
            "skills": ["rust", "postgres"],
            "numberOfHires": 2,
            "plan": "plan-pro",
            "status": "in_progress",
            "createdAt": "2026-02-01T09:30:00Z"
        })
    }

    fn create_request() -> CreateHiringRequest {
        CreateHiringRequest {
            title: "Backend Engineer".to_string(),
            headcount: 2,
            pricing_plan_id: "plan-pro".to_string(),
            skills: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    async fn service_with(router: Router) -> RequestService {
        let base = spawn_api(router).await;
        let (client, _) = test_client(&base, signed_in_session("u1").await);
        RequestService::new(client)
    }

    fn offline_service() -> RequestService {
        let (client, _) = test_client("http://127.0.0.1:9", crate::auth::SessionStore::in_memory());
        RequestService::new(client)
    }

    #[test]
    fn test_request_model_from_api_shape() {
        let request: HiringRequest = serde_json::from_value(request_json("r1")).unwrap();
        assert_eq!(request.id, "r1");
        assert_eq!(request.headcount, 2);
        assert_eq!(request.pricing_plan_id.as_deref(), Some("plan-pro"));
        assert_eq!(request.status, RequestStatus::Active);

        let unknown: HiringRequest = serde_json::from_value(json!({
            "id": "r2",
            "title": "Designer",
            "status": "archived"
        }))
        .unwrap();
        assert_eq!(unknown.status, RequestStatus::Other);
        assert_eq!(unknown.headcount, 1);
    }

    #[test]
    fn test_create_validation() {
        assert!(HiringRequestValidator.validate(&create_request()).is_valid);

        let invalid = CreateHiringRequest {
            title: "   ".to_string(),
            headcount: 0,
            pricing_plan_id: String::new(),
            ..Default::default()
        };
        let fields = HiringRequestValidator.validate(&invalid).field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("headcount"));
        assert!(fields.contains_key("pricingPlanId"));

        let long_title = CreateHiringRequest {
            title: "t".repeat(MAX_TITLE_LENGTH + 1),
            ..create_request()
        };
        assert!(!HiringRequestValidator.validate(&long_title).is_valid);
    }

    #[test]
    fn test_update_validation() {
        assert!(HiringRequestValidator
            .validate(&UpdateHiringRequest::default())
            .is_valid);
        assert!(!HiringRequestValidator
            .validate(&UpdateHiringRequest {
                headcount: Some(0),
                ..Default::default()
            })
            .is_valid);
    }

    #[test]
    fn test_candidate_decision_validation() {
        let empty = CandidateDecision {
            candidate_ids: vec![],
            reason: None,
        };
        assert!(!CandidateDecisionValidator.validate(&empty).is_valid);

        let long_reason = CandidateDecision {
            candidate_ids: vec!["c1".to_string()],
            reason: Some("r".repeat(MAX_REASON_LENGTH + 1)),
        };
        assert!(!CandidateDecisionValidator.validate(&long_reason).is_valid);
    }

    #[test]
    fn test_candidate_display_name() {
        let candidate: Candidate = serde_json::from_value(json!({
            "_id": "c1",
            "firstName": "Ada",
            "status": "shortlisted"
        }))
        .unwrap();
        assert_eq!(candidate.display_name(), "Ada");

        let anonymous: Candidate =
            serde_json::from_value(json!({"id": "c2", "status": "hired"})).unwrap();
        assert_eq!(anonymous.display_name(), "c2");
    }

    #[tokio::test]
    async fn test_list_sends_filters() {
        let router = Router::new().route(
            "/requests",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("page").map(String::as_str), Some("2"));
                assert_eq!(params.get("status").map(String::as_str), Some("active"));
                assert_eq!(params.get("search").map(String::as_str), Some("rust dev"));
                assert!(!params.contains_key("limit"));
                Json(json!({
                    "data": {
                        "requests": [request_json("r1"), request_json("r2")],
                        "pagination": {"total": 12, "page": 2, "limit": 10, "pages": 2}
                    }
                }))
            }),
        );
        let service = service_with(router).await;

        let query = ListQuery::default()
            .page(2)
            .search("rust dev")
            .status(RequestStatus::Active.as_filter());
        let page = service.list(&query).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn test_create_get_update_and_plans() {
        let router = Router::new()
            .route(
                "/requests",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["pricingPlanId"], "plan-pro");
                    assert_eq!(body["headcount"], 2);
                    Json(json!({"data": {"request": request_json("r-new")}}))
                }),
            )
            .route(
                "/requests/pricing-plans",
                get(|| async {
                    Json(json!({"data": {"plans": [
                        {"_id": "plan-basic", "name": "Basic", "price": 50000, "features": ["5 candidates"]},
                        {"_id": "plan-pro", "name": "Pro", "price": 120000, "maxCandidates": 15}
                    ]}}))
                }),
            )
            .route(
                "/requests/:id",
                get(|Path(id): Path<String>| async move { Json(request_json(&id)) }).patch(
                    |Path(id): Path<String>, Json(body): Json<Value>| async move {
                        assert_eq!(body, json!({"status": "cancelled"}));
                        let mut request = request_json(&id);
                        request["status"] = json!("cancelled");
                        Json(request)
                    },
                ),
            );
        let service = service_with(router).await;

        let created = service.create(create_request()).await.unwrap();
        assert_eq!(created.id, "r-new");

        let fetched = service.get("r-new").await.unwrap();
        assert_eq!(fetched.title, "Backend Engineer");

        let updated = service
            .update(
                "r-new",
                UpdateHiringRequest {
                    status: Some(RequestStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Cancelled);

        let plans = service.pricing_plans().await.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].max_candidates, Some(15));
    }

    #[tokio::test]
    async fn test_candidate_actions() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));

        async fn record(
            State(calls): State<Calls>,
            Path((id, action)): Path<(String, String)>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            calls.lock().unwrap().push((format!("{}:{}", id, action), body));
            Json(json!({"success": true}))
        }

        async fn hire(
            State(calls): State<Calls>,
            Path((id, candidate)): Path<(String, String)>,
        ) -> Json<Value> {
            calls
                .lock()
                .unwrap()
                .push((format!("{}:hire:{}", id, candidate), Value::Null));
            Json(json!({"message": "Candidate hired"}))
        }

        let router = Router::new()
            .route(
                "/requests/:id/candidates",
                get(|| async {
                    Json(json!({"candidates": [
                        {"_id": "c1", "firstName": "Ada", "status": "shortlisted", "matchScore": 0.92},
                        {"_id": "c2", "status": "accepted"}
                    ]}))
                }),
            )
            .route("/requests/:id/candidates/:target", post(record))
            .route("/requests/:id/candidates/:target/hire", post(hire))
            .with_state(calls.clone());
        let service = service_with(router).await;

        let shortlist = service.shortlisted_candidates("r1").await.unwrap();
        assert_eq!(shortlist.len(), 2);
        assert_eq!(shortlist[1].status, CandidateStatus::Accepted);

        service
            .accept_candidates("r1", &["c1".to_string()])
            .await
            .unwrap();
        service
            .reject_candidates("r1", &["c2".to_string()], Some("  Not enough experience "))
            .await
            .unwrap();
        service.mark_hired("r1", "c1").await.unwrap();

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "r1:accept");
        assert_eq!(calls[0].1, json!({"candidateIds": ["c1"]}));
        assert_eq!(calls[1].0, "r1:reject");
        assert_eq!(
            calls[1].1,
            json!({"candidateIds": ["c2"], "reason": "Not enough experience"})
        );
        assert_eq!(calls[2].0, "r1:hire:c1");
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_request() {
        let service = offline_service();

        let accept = service.accept_candidates("r1", &[]).await.unwrap_err();
        assert!(matches!(accept, ApiError::ValidationError(_)));

        let reject = service.reject_candidates("r1", &[], None).await.unwrap_err();
        assert!(matches!(reject, ApiError::ValidationError(_)));

        let hire = service.mark_hired("r1", " ").await.unwrap_err();
        assert!(matches!(hire, ApiError::ValidationError(_)));

        let create = service
            .create(CreateHiringRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(create, ApiError::ValidationError(_)));
    }
}
