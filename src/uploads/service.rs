use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::info;

use super::models::{UploadKind, UploadedFile};
use super::validators::validate_upload;
use crate::common::{ApiClient, ApiError};

#[derive(Clone)]
pub struct UploadService {
    api: ApiClient,
}

impl UploadService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sends the file as the `file` part of a multipart form
    pub async fn upload(
        &self,
        kind: UploadKind,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<UploadedFile, ApiError> {
        let mime_type = validate_upload(kind, file_name, &data)?;
        let size = data.len();

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(&mime_type)?;
        let form = Form::new().part("file", part);

        let uploaded: UploadedFile = self.api.post_multipart(kind.path(), form).await?;
        info!(
            kind = ?kind,
            file_name = %file_name,
            mime_type = %mime_type,
            size = size,
            "File uploaded"
        );
        Ok(uploaded)
    }

    pub async fn upload_path(&self, kind: UploadKind, path: &Path) -> Result<UploadedFile, ApiError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::invalid("file", "File name is not valid UTF-8"))?;
        self.upload(kind, file_name, data).await
    }
}
