use super::models::{SignInRequest, SignUpRequest, VerifyOtpRequest};
use crate::common::validation::is_valid_email;
use crate::common::{ValidationResult, Validator};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const OTP_LENGTH: usize = 6;

pub struct SignUpValidator;

impl Validator<SignUpRequest> for SignUpValidator {
    fn validate(&self, data: &SignUpRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.first_name.trim().is_empty() {
            result.add_error("firstName", "First name is required");
        }
        if data.last_name.trim().is_empty() {
            result.add_error("lastName", "Last name is required");
        }

        result.merge(validate_email_field(&data.email));
        result.merge(validate_password(&data.password));

        if let Some(phone) = &data.phone {
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            if !phone.trim().is_empty() && !(7..=15).contains(&digits) {
                result.add_error("phone", "Phone number must have between 7 and 15 digits");
            }
        }

        result
    }
}

pub struct SignInValidator;

impl Validator<SignInRequest> for SignInValidator {
    fn validate(&self, data: &SignInRequest) -> ValidationResult {
        let mut result = validate_email_field(&data.email);
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result
    }
}

pub struct OtpValidator;

impl Validator<VerifyOtpRequest> for OtpValidator {
    fn validate(&self, data: &VerifyOtpRequest) -> ValidationResult {
        let mut result = validate_email_field(&data.email);
        let otp = data.otp.trim();
        if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
            result.add_error("otp", "Enter the 6-digit code sent to your email");
        }
        result
    }
}

pub fn validate_email_field(email: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !is_valid_email(email) {
        result.add_error("email", "Enter a valid email address");
    }
    result
}

pub fn validate_password(password: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error("password", "Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        result.add_error("password", "Password must contain at least one number");
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        result.add_error("password", "Password must contain at least one letter");
    }
    result
}
