use super::fees::validate_funding_amount;
use super::models::FundWalletRequest;
use crate::auth::validators::validate_email_field;
use crate::common::{ApiError, ValidationResult, Validator};

pub struct FundWalletValidator;

impl Validator<FundWalletRequest> for FundWalletValidator {
    fn validate(&self, data: &FundWalletRequest) -> ValidationResult {
        let mut result = validate_email_field(&data.email);

        if let Err(ApiError::ValidationError(errors)) = validate_funding_amount(data.amount) {
            for error in errors {
                result.add_error(&error.field, &error.message);
            }
        }

        result
    }
}
