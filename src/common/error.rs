// Error handling types for the portal client

use serde_json::Value;
use std::fmt;
use tracing::{debug, error};

use super::validation::{FieldError, ValidationResult};

/// Fallback shown when the server gives us nothing better
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Normalised error returned by every service call
#[derive(Debug, Clone)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    ServerError { status: u16, message: String },
    ValidationError(Vec<FieldError>),
    Network(String),
    Timeout(String),
    Serialization(String),
    Storage(String),
    Channel(String),
    Navigation(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ServerError { status, message } => {
                write!(f, "Server Error ({}): {}", status, message)
            }
            ApiError::ValidationError(errors) => {
                let joined: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation Error: {}", joined.join(", "))
            }
            ApiError::Network(msg) => write!(f, "Network Error: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ApiError::Serialization(msg) => write!(f, "Serialization Error: {}", msg),
            ApiError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            ApiError::Channel(msg) => write!(f, "Channel Error: {}", msg),
            ApiError::Navigation(msg) => write!(f, "Navigation Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Build an error from a non-2xx response, preferring the server's own message
    pub fn from_response(status: u16, body: &str) -> Self {
        let message =
            extract_server_message(body).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        match status {
            400 | 422 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => {
                if status >= 500 {
                    error!(status = status, message = %message, "Server returned an error");
                }
                ApiError::ServerError { status, message }
            }
        }
    }

    /// The text a UI renders in a banner or toast
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServerError { message: msg, .. } => msg.clone(),
            ApiError::ValidationError(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            ApiError::Network(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Timeout(_) => "The request timed out. Please try again.".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Single-field validation failure
    pub fn invalid(field: &str, message: &str) -> Self {
        ApiError::ValidationError(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

/// Pulls a human readable message out of the shapes the API uses:
/// `{"message"}`, `{"error": "..."}`, `{"error": {"message"}}`, `{"errors": [...]}`
fn extract_server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    let message = json
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| json.get("error").and_then(Value::as_str))
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .or_else(|| {
            json.get("errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(|first| {
                    first
                        .as_str()
                        .map(str::to_string)
                        .or_else(|| first.get("message").and_then(Value::as_str).map(str::to_string))
                        .or_else(|| first.get("msg").and_then(Value::as_str).map(str::to_string))
                })
        })?;

    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApiError::Serialization(err.to_string())
        } else {
            debug!(error = %err, "HTTP transport error");
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::ValidationError(Vec::new())
        } else {
            ApiError::ValidationError(result.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_prefers_server_message() {
        let err = ApiError::from_response(400, r#"{"message": "Plan is no longer available"}"#);
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.user_message(), "Plan is no longer available");

        let err = ApiError::from_response(409, r#"{"error": {"message": "Email already used"}}"#);
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.user_message(), "Email already used");

        let err = ApiError::from_response(422, r#"{"errors": [{"msg": "amount is invalid"}]}"#);
        assert_eq!(err.user_message(), "amount is invalid");
    }

    #[test]
    fn test_from_response_generic_fallback() {
        let err = ApiError::from_response(502, "<html>Bad gateway</html>");
        match err {
            ApiError::ServerError { status, ref message } => {
                assert_eq!(status, 502);
                assert_eq!(message, GENERIC_ERROR_MESSAGE);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = ApiError::from_response(500, r#"{"message": "   "}"#);
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = ApiError::from_response(401, r#"{"message": "jwt expired"}"#);
        assert!(err.is_unauthorized());
        assert!(!ApiError::invalid("email", "required").is_unauthorized());
    }

    #[test]
    fn test_validation_error_display() {
        let mut result = ValidationResult::new();
        result.add_error("email", "Email is required");
        result.add_error("password", "Password is required");
        let err = ApiError::from(result);

        assert_eq!(
            err.to_string(),
            "Validation Error: email: Email is required, password: Password is required"
        );
        assert_eq!(err.user_message(), "Email is required");
    }
}
