// src/common/storage.rs
//! File-backed key/value storage, one JSON document per key

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ApiError;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
            .collect();
        self.dir.join(format!("{}.json", safe.trim_start_matches('.')))
    }

    pub async fn get_item(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored item");
                None
            }
        }
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        // Readers only ever see a complete file; each writer gets its own temp file
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(key = %key, "Stored item");
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        LocalStorage::new(std::env::temp_dir().join(format!("orgportal-test-{}", uuid::Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = temp_storage();
        assert_eq!(storage.get_item("session").await, None);

        storage.set_item("session", "{\"token\":\"t\"}").await.unwrap();
        assert_eq!(
            storage.get_item("session").await.as_deref(),
            Some("{\"token\":\"t\"}")
        );

        storage.remove_item("session").await.unwrap();
        assert_eq!(storage.get_item("session").await, None);

        // Removing twice is fine
        storage.remove_item("session").await.unwrap();
        let _ = tokio::fs::remove_dir_all(storage.dir()).await;
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_directory() {
        let storage = temp_storage();
        let path = storage.path_for("../../etc/passwd");
        assert!(path.starts_with(storage.dir()));
    }
}
