use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::models::{Notification, NotificationListResponse, NotificationStats};
use super::store::NotificationStore;
use crate::common::{ApiClient, ApiError};

/// REST side of notifications; the channel persists read changes through it
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Notification>, ApiError>;
    async fn stats(&self) -> Result<NotificationStats, ApiError>;
    async fn mark_as_read(&self, id: &str) -> Result<(), ApiError>;
    async fn mark_all_as_read(&self) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Bulk fetch of list and stats, applied to the store
    pub async fn refresh(&self, store: &NotificationStore) -> Result<(), ApiError> {
        let (list, stats) = tokio::join!(self.list(), self.stats());
        let list = list?;
        info!(count = list.len(), "Fetched notifications");
        store.set_notifications(list).await;
        store.set_stats(stats?).await;
        Ok(())
    }
}

#[async_trait]
impl NotificationBackend for NotificationService {
    async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        let response: NotificationListResponse = self.api.get("/notifications").await?;
        Ok(response.into_vec())
    }

    async fn stats(&self) -> Result<NotificationStats, ApiError> {
        self.api.get("/notifications/stats").await
    }

    async fn mark_as_read(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", urlencoding::encode(id));
        let _: Value = self.api.patch(&path, &serde_json::json!({})).await?;
        Ok(())
    }

    async fn mark_all_as_read(&self) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .patch("/notifications/read-all", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
