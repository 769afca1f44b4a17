//! # Requests Module
//!
//! Hiring requests placed by the organisation, the pricing plans they are
//! bought against, and the candidate shortlist for each request.

pub mod models;
pub mod service;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::{
    Candidate, CandidateStatus, CreateHiringRequest, HiringRequest, PricingPlan, RequestStatus,
    UpdateHiringRequest,
};
pub use service::RequestService;
