use super::models::{CandidateDecision, CreateHiringRequest, UpdateHiringRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_REASON_LENGTH: usize = 500;

pub struct HiringRequestValidator;

impl Validator<CreateHiringRequest> for HiringRequestValidator {
    fn validate(&self, data: &CreateHiringRequest) -> ValidationResult {
        let mut result = validate_title(&data.title);

        if data.pricing_plan_id.trim().is_empty() {
            result.add_error("pricingPlanId", "Select a pricing plan");
        }
        if data.headcount < 1 {
            result.add_error("headcount", "At least one hire is required");
        }

        result
    }
}

impl Validator<UpdateHiringRequest> for HiringRequestValidator {
    fn validate(&self, data: &UpdateHiringRequest) -> ValidationResult {
        let mut result = match &data.title {
            Some(title) => validate_title(title),
            None => ValidationResult::new(),
        };
        if data.headcount == Some(0) {
            result.add_error("headcount", "At least one hire is required");
        }
        result
    }
}

fn validate_title(title: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if title.trim().is_empty() {
        result.add_error("title", "Title is required");
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        result.add_error("title", "Title must not exceed 200 characters");
    }
    result
}

pub struct CandidateDecisionValidator;

impl Validator<CandidateDecision> for CandidateDecisionValidator {
    fn validate(&self, data: &CandidateDecision) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.candidate_ids.is_empty() {
            result.add_error("candidateIds", "Select at least one candidate");
        }
        if data.candidate_ids.iter().any(|id| id.trim().is_empty()) {
            result.add_error("candidateIds", "Candidate ids must not be blank");
        }
        if let Some(reason) = &data.reason {
            if reason.chars().count() > MAX_REASON_LENGTH {
                result.add_error("reason", "Reason must not exceed 500 characters");
            }
        }

        result
    }
}
