use tracing::{info, warn};

use super::models::*;
use super::validators::{validate_email_field, OtpValidator, SignInValidator, SignUpValidator};
use crate::common::{safe_email_log, ApiClient, ApiError, Validator};

/// Sign-up, sign-in and account settings against `/auth` and `/users`
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Registers a new organisation user; an OTP is e-mailed for verification
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<MessageResponse, ApiError> {
        SignUpValidator.validate(&request).into_result()?;

        let response: MessageResponse = self.api.post("/auth/register", &request).await?;
        info!(email = %safe_email_log(&request.email), "Sign-up submitted");
        Ok(response)
    }

    /// Signs in. The session is only set when the server hands back a full user/token pair.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<SignInOutcome, ApiError> {
        SignInValidator.validate(&request).into_result()?;

        let response: SignInResponse = self.api.post("/auth/login", &request).await?;
        let outcome = response.into_outcome(&request.email)?;

        match &outcome {
            SignInOutcome::Authenticated { user, token } => {
                self.api
                    .session()
                    .set_user(Some(user.clone()), Some(token.clone()))
                    .await?;
                info!(user_id = %user.id, "Signed in");
            }
            SignInOutcome::TwoFactorRequired { email } => {
                info!(email = %safe_email_log(email), "Two-factor code required");
            }
            SignInOutcome::EmailVerificationRequired { email } => {
                info!(email = %safe_email_log(email), "Email verification required");
            }
        }

        Ok(outcome)
    }

    /// Submits an OTP for either email verification or the two-factor step
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<Option<User>, ApiError> {
        OtpValidator.validate(&request).into_result()?;

        let payload: AuthPayload = self.api.post("/auth/verify-email", &request).await?;
        match (payload.user, payload.token) {
            (Some(user), Some(token)) if !token.is_empty() => {
                self.api
                    .session()
                    .set_user(Some(user.clone()), Some(token))
                    .await?;
                info!(user_id = %user.id, "OTP verified, session started");
                Ok(Some(user))
            }
            _ => {
                // Verified but no session issued; the user signs in next
                info!(email = %safe_email_log(&request.email), "OTP verified without session");
                Ok(None)
            }
        }
    }

    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        validate_email_field(email).into_result()?;
        self.api
            .post(
                "/auth/resend-otp",
                &ResendOtpRequest {
                    email: email.trim().to_string(),
                },
            )
            .await
    }

    /// Local sign-out; there is no server-side session to revoke
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if let Some(user) = self.api.session().user().await {
            info!(user_id = %user.id, "Signing out");
        }
        self.api.session().clear_user().await
    }

    pub async fn update_settings(&self, update: UserSettingsUpdate) -> Result<User, ApiError> {
        if !self.api.session().is_authenticated().await {
            return Err(ApiError::Unauthorized("Sign in to change settings".to_string()));
        }

        let user: User = self.api.patch("/users/settings", &update).await?;
        let stored = user.clone();
        if !self.api.session().update_user(move |u| *u = stored).await? {
            warn!("Settings updated but session disappeared meanwhile");
        }
        Ok(user)
    }
}
