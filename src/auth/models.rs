//! Authentication data models

use serde::{Deserialize, Serialize};

use crate::common::ApiError;

/// Signed-in organisation user as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "organisation")]
    pub organisation_id: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Whether onboarding (organisation profile) has been completed
    pub fn has_organisation(&self) -> bool {
        self.organisation_id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Raw `/auth/login` payload; see [`SignInResponse::into_outcome`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub requires_two_factor: bool,
    #[serde(default)]
    pub requires_email_verification: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What the sign-in screen does next
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    Authenticated { user: User, token: String },
    TwoFactorRequired { email: String },
    EmailVerificationRequired { email: String },
}

impl SignInResponse {
    /// Classifies the response. Intermediate steps win over a stray user/token pair.
    pub fn into_outcome(self, requested_email: &str) -> Result<SignInOutcome, ApiError> {
        let email = self
            .email
            .clone()
            .unwrap_or_else(|| requested_email.to_string());

        if self.requires_two_factor {
            return Ok(SignInOutcome::TwoFactorRequired { email });
        }
        if self.requires_email_verification {
            return Ok(SignInOutcome::EmailVerificationRequired { email });
        }
        match (self.user, self.token) {
            (Some(user), Some(token)) if !token.is_empty() => {
                Ok(SignInOutcome::Authenticated { user, token })
            }
            _ => Err(ApiError::Serialization(
                "sign-in response carried neither a session nor a next step".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Full session payload returned once verification completes
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
