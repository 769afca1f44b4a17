use serde_json::Value;
use tracing::info;

use super::models::*;
use super::validators::{CandidateDecisionValidator, HiringRequestValidator};
use crate::common::{ApiClient, ApiError, ListQuery, Paginated, Validator};

fn request_path(id: &str) -> String {
    format!("/requests/{}", urlencoding::encode(id))
}

/// Hiring requests and their shortlisted candidates
#[derive(Clone)]
pub struct RequestService {
    api: ApiClient,
}

impl RequestService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<HiringRequest>, ApiError> {
        self.api.get(&query.append_to_path("/requests")).await
    }

    pub async fn get(&self, id: &str) -> Result<HiringRequest, ApiError> {
        let response: HiringRequestResponse = self.api.get(&request_path(id)).await?;
        Ok(response.into_request())
    }

    /// Submits a new request against a pricing plan
    pub async fn create(&self, request: CreateHiringRequest) -> Result<HiringRequest, ApiError> {
        HiringRequestValidator.validate(&request).into_result()?;

        let response: HiringRequestResponse = self.api.post("/requests", &request).await?;
        let created = response.into_request();
        info!(request_id = %created.id, plan = %request.pricing_plan_id, "Hiring request created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateHiringRequest,
    ) -> Result<HiringRequest, ApiError> {
        HiringRequestValidator.validate(&request).into_result()?;

        let response: HiringRequestResponse = self.api.patch(&request_path(id), &request).await?;
        Ok(response.into_request())
    }

    pub async fn pricing_plans(&self) -> Result<Vec<PricingPlan>, ApiError> {
        let plans: PricingPlanList = self.api.get("/requests/pricing-plans").await?;
        Ok(plans.into_vec())
    }

    pub async fn shortlisted_candidates(&self, id: &str) -> Result<Vec<Candidate>, ApiError> {
        let path = format!("{}/candidates", request_path(id));
        let list: CandidateList = self.api.get(&path).await?;
        Ok(list.into_vec())
    }

    pub async fn accept_candidates(&self, id: &str, candidate_ids: &[String]) -> Result<(), ApiError> {
        let decision = CandidateDecision {
            candidate_ids: candidate_ids.to_vec(),
            reason: None,
        };
        self.decide(id, "accept", decision).await
    }

    pub async fn reject_candidates(
        &self,
        id: &str,
        candidate_ids: &[String],
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        let decision = CandidateDecision {
            candidate_ids: candidate_ids.to_vec(),
            reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        };
        self.decide(id, "reject", decision).await
    }

    pub async fn mark_hired(&self, id: &str, candidate_id: &str) -> Result<(), ApiError> {
        if candidate_id.trim().is_empty() {
            return Err(ApiError::invalid("candidateId", "Candidate id is required"));
        }
        let path = format!(
            "{}/candidates/{}/hire",
            request_path(id),
            urlencoding::encode(candidate_id)
        );
        let _: Value = self.api.post(&path, &serde_json::json!({})).await?;
        info!(request_id = %id, candidate_id = %candidate_id, "Candidate marked as hired");
        Ok(())
    }

    async fn decide(&self, id: &str, action: &str, decision: CandidateDecision) -> Result<(), ApiError> {
        CandidateDecisionValidator.validate(&decision).into_result()?;

        let path = format!("{}/candidates/{}", request_path(id), action);
        let _: Value = self.api.post(&path, &decision).await?;
        info!(
            request_id = %id,
            action = %action,
            count = decision.candidate_ids.len(),
            "Candidate decision recorded"
        );
        Ok(())
    }
}
