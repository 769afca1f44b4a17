//! Tests for organisations module
//!
//! These tests verify:
//! - Organisation field validation
//! - Creating an organisation completes onboarding for the session
//! - Response envelopes are unwrapped

#[cfg(test)]
mod tests {
    use axum::{
        http::HeaderMap,
        routing::{get, patch, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::super::models::*;
    use super::super::validators::OrganisationValidator;
    use super::super::OrganisationService;
    use crate::auth::guard::{RouteDecision, RouteGuard, RouteKind};
    use crate::auth::session::SessionStore;
    use crate::common::testing::{sample_user, spawn_api, test_client};
    use crate::common::{ApiError, Validator};

    fn organisation_json(id: &str, name: &str) -> Value {
        json!({
            "_id": id,
            "name": name,
            "website": "https://acme.io",
            "contactEmail": "hr@acme.io"
        })
    }

    #[test]
    fn test_create_validation() {
        let valid = CreateOrganisationRequest {
            name: "Acme Ltd".to_string(),
            website: Some("https://acme.io".to_string()),
            contact_email: Some("hr@acme.io".to_string()),
            ..Default::default()
        };
        assert!(OrganisationValidator.validate(&valid).is_valid);

        let invalid = CreateOrganisationRequest {
            name: "x".repeat(256),
            website: Some("acme.io".to_string()),
            contact_email: Some("hr-at-acme".to_string()),
            ..Default::default()
        };
        let fields = OrganisationValidator.validate(&invalid).field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("website"));
        assert!(fields.contains_key("contactEmail"));

        let blank = CreateOrganisationRequest::default();
        assert!(!OrganisationValidator.validate(&blank).is_valid);
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        assert!(OrganisationValidator
            .validate(&UpdateOrganisationRequest::default())
            .is_valid);

        let renamed_to_blank = UpdateOrganisationRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!OrganisationValidator.validate(&renamed_to_blank).is_valid);
    }

    #[tokio::test]
    async fn test_create_completes_onboarding() {
        let app = Router::new().route(
            "/organisations/create",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer token-u1");
                assert!(body.get("description").is_none());
                Json(json!({"data": {"organisation": organisation_json("org-9", body["name"].as_str().unwrap())}}))
            }),
        );
        let base = spawn_api(app).await;

        let mut user = sample_user("u1");
        user.organisation_id = None;
        let session = SessionStore::in_memory();
        session
            .set_user(Some(user), Some("token-u1".to_string()))
            .await
            .unwrap();
        assert_eq!(
            RouteGuard::evaluate(&session.snapshot().await, RouteKind::Protected),
            RouteDecision::RedirectToOnboarding
        );

        let (client, _) = test_client(&base, session.clone());
        let organisation = OrganisationService::new(client)
            .create(CreateOrganisationRequest {
                name: "Acme Ltd".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(organisation.id, "org-9");
        assert_eq!(
            session.user().await.unwrap().organisation_id.as_deref(),
            Some("org-9")
        );
        assert_eq!(
            RouteGuard::evaluate(&session.snapshot().await, RouteKind::Protected),
            RouteDecision::Allow
        );
    }

    #[tokio::test]
    async fn test_invalid_create_makes_no_request() {
        let session = SessionStore::in_memory();
        let (client, _) = test_client("http://127.0.0.1:9", session);

        let err = OrganisationService::new(client)
            .create(CreateOrganisationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_info_and_update() {
        let app = Router::new()
            .route(
                "/organisations/info",
                get(|| async { Json(organisation_json("org-1", "Acme Ltd")) }),
            )
            .route(
                "/organisations/update",
                patch(|Json(body): Json<Value>| async move {
                    assert_eq!(body, json!({"industry": "Logistics"}));
                    let mut org = organisation_json("org-1", "Acme Ltd");
                    org["industry"] = json!("Logistics");
                    Json(json!({"success": true, "data": org}))
                }),
            );
        let base = spawn_api(app).await;
        let session = SessionStore::in_memory();
        session
            .set_user(Some(sample_user("u1")), Some("token-u1".to_string()))
            .await
            .unwrap();
        let (client, _) = test_client(&base, session);
        let service = OrganisationService::new(client);

        let info = service.get_info().await.unwrap();
        assert_eq!(info.contact_email.as_deref(), Some("hr@acme.io"));

        let updated = service
            .update(UpdateOrganisationRequest {
                industry: Some("Logistics".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.industry.as_deref(), Some("Logistics"));
    }
}
