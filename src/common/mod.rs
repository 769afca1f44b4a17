// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod http;
pub mod navigation;
pub mod query;
pub mod state;
pub mod storage;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::PortalConfig;
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log};
pub use http::ApiClient;
pub use navigation::{MemoryNavigator, Navigator};
pub use query::{ListQuery, Paginated};
pub use state::AppState;
pub use storage::LocalStorage;
pub use validation::{FieldError, ValidationResult, Validator};

#[cfg(test)]
pub(crate) mod testing;
