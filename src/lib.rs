//! Client side of the organisation recruitment portal: session and
//! onboarding, hiring requests, real-time notifications and the wallet.

pub mod auth;
pub mod common;
pub mod notifications;
pub mod organisations;
pub mod requests;
pub mod uploads;
pub mod wallet;
