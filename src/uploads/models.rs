use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Organisation logo
    Logo,
    /// Supporting document for a request
    Document,
}

impl UploadKind {
    pub fn path(&self) -> &'static str {
        match self {
            UploadKind::Logo => "/uploads/logo",
            UploadKind::Document => "/uploads/document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(alias = "fileUrl", alias = "location", alias = "secure_url")]
    pub url: String,
    #[serde(default, alias = "filename", alias = "originalName")]
    pub file_name: Option<String>,
    #[serde(default, alias = "mimetype")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}
