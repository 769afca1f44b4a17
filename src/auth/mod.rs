//! # Auth Module
//!
//! Everything about who is using the portal:
//! - Sign-up, sign-in (with two-factor and email verification steps), OTP verification
//! - The persisted session and its user/token invariant
//! - Route guarding for unauthenticated and unconfigured users

pub mod guard;
pub mod models;
pub mod service;
pub mod session;
pub mod validators;


pub use guard::{RouteDecision, RouteGuard, RouteKind};
pub use models::{SignInOutcome, User};
pub use service::AuthService;
pub use session::{Session, SessionStore};
