use super::models::{CreateOrganisationRequest, UpdateOrganisationRequest};
use crate::common::validation::is_valid_email;
use crate::common::{ValidationResult, Validator};

pub const MAX_NAME_LENGTH: usize = 255;

pub struct OrganisationValidator;

impl Validator<CreateOrganisationRequest> for OrganisationValidator {
    fn validate(&self, data: &CreateOrganisationRequest) -> ValidationResult {
        let mut result = validate_name(&data.name);
        result.merge(validate_optional_fields(
            data.website.as_deref(),
            data.contact_email.as_deref(),
        ));
        result
    }
}

impl Validator<UpdateOrganisationRequest> for OrganisationValidator {
    fn validate(&self, data: &UpdateOrganisationRequest) -> ValidationResult {
        let mut result = match &data.name {
            Some(name) => validate_name(name),
            None => ValidationResult::new(),
        };
        result.merge(validate_optional_fields(
            data.website.as_deref(),
            data.contact_email.as_deref(),
        ));
        result
    }
}

fn validate_name(name: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if name.trim().is_empty() {
        result.add_error("name", "Organisation name is required");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        result.add_error("name", "Organisation name must not exceed 255 characters");
    }
    result
}

fn validate_optional_fields(website: Option<&str>, contact_email: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(website) = website {
        if !website.is_empty() && !website.starts_with("http://") && !website.starts_with("https://")
        {
            result.add_error(
                "website",
                "Website must be a valid URL starting with http:// or https://",
            );
        }
    }

    if let Some(email) = contact_email {
        if !email.trim().is_empty() && !is_valid_email(email) {
            result.add_error("contactEmail", "Enter a valid contact email");
        }
    }

    result
}
