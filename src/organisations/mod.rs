//! # Organisations Module
//!
//! The organisation behind the signed-in user. Creating one completes
//! onboarding.

pub mod models;
pub mod service;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::{CreateOrganisationRequest, Organisation, UpdateOrganisationRequest};
pub use service::OrganisationService;
