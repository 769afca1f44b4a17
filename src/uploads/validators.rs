//! File checks run before anything is sent

use std::path::Path;

use super::models::UploadKind;
use crate::common::ApiError;

pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const LOGO_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

const DOCUMENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Content sniffing first, then the file extension
pub fn detect_mime_type(file_name: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    content_type_from_extension(file_name).to_string()
}

fn content_type_from_extension(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

pub fn is_allowed_type(kind: UploadKind, mime_type: &str) -> bool {
    match kind {
        UploadKind::Logo => LOGO_TYPES.contains(&mime_type),
        UploadKind::Document => {
            LOGO_TYPES.contains(&mime_type) || DOCUMENT_TYPES.contains(&mime_type)
        }
    }
}

pub fn max_bytes(kind: UploadKind) -> usize {
    match kind {
        UploadKind::Logo => MAX_LOGO_BYTES,
        UploadKind::Document => MAX_DOCUMENT_BYTES,
    }
}

/// Returns the MIME type to send with the file
pub fn validate_upload(kind: UploadKind, file_name: &str, data: &[u8]) -> Result<String, ApiError> {
    if file_name.trim().is_empty() {
        return Err(ApiError::invalid("file", "File name is required"));
    }
    if data.is_empty() {
        return Err(ApiError::invalid("file", "The selected file is empty"));
    }
    if data.len() > max_bytes(kind) {
        let message = match kind {
            UploadKind::Logo => "Logo must be 2 MB or smaller",
            UploadKind::Document => "Document must be 10 MB or smaller",
        };
        return Err(ApiError::invalid("file", message));
    }

    let mime_type = detect_mime_type(file_name, data);
    if !is_allowed_type(kind, &mime_type) {
        let message = match kind {
            UploadKind::Logo => "Only PNG, JPEG, GIF, WebP or SVG images are allowed",
            UploadKind::Document => "Only PDF, Word documents or images are allowed",
        };
        return Err(ApiError::invalid("file", message));
    }

    Ok(mime_type)
}
