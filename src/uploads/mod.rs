//! # Uploads Module
//!
//! Logo and document uploads. Files are type-checked and size-checked
//! locally, then sent as multipart forms.

pub mod models;
pub mod service;
pub mod validators;


pub use models::{UploadKind, UploadedFile};
pub use service::UploadService;
