use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::models::{Notification, NotificationStats};

/// Retention window; older entries are evicted first
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Default)]
struct StoreState {
    // Newest first
    notifications: Vec<Notification>,
    stats: Option<NotificationStats>,
    pending_sync: HashSet<String>,
}

impl StoreState {
    fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// What the UI shows right now.
///
/// Written by bulk fetches, pushed notifications and local read changes.
/// The unread count is always derived from the retained list; the server
/// `stats` are kept alongside as a separate value and never reconciled.
#[derive(Clone)]
pub struct NotificationStore {
    state: Arc<RwLock<StoreState>>,
    unread_tx: Arc<watch::Sender<usize>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        let (unread_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            unread_tx: Arc::new(unread_tx),
        }
    }

    fn publish(&self, state: &StoreState) {
        self.unread_tx.send_replace(state.unread_count());
    }

    /// Full replace after a bulk fetch
    pub async fn set_notifications(&self, list: Vec<Notification>) {
        let mut seen = HashSet::new();
        let mut deduped: Vec<Notification> = list
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        deduped.truncate(MAX_NOTIFICATIONS);

        let mut state = self.state.write().await;
        state.notifications = deduped;
        self.publish(&state);
        debug!(
            count = state.notifications.len(),
            unread = state.unread_count(),
            "Notifications replaced"
        );
    }

    /// Prepends unless the id is already known; returns whether it was inserted
    pub async fn add_notification(&self, notification: Notification) -> bool {
        let mut state = self.state.write().await;
        if state.notifications.iter().any(|n| n.id == notification.id) {
            debug!(notification_id = %notification.id, "Duplicate notification ignored");
            return false;
        }

        state.notifications.insert(0, notification);
        state.notifications.truncate(MAX_NOTIFICATIONS);
        self.publish(&state);
        true
    }

    /// Returns whether the flag actually changed
    pub async fn mark_as_read(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        let changed = match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        };
        self.publish(&state);
        changed
    }

    /// Returns the ids that were unread before the call
    pub async fn mark_all_as_read(&self) -> Vec<String> {
        let mut state = self.state.write().await;
        let mut flipped = Vec::new();
        for n in state.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            flipped.push(n.id.clone());
        }
        self.publish(&state);
        flipped
    }

    pub async fn remove_notification(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        self.publish(&state);
        state.notifications.len() != before
    }

    pub async fn clear_all(&self) {
        let mut state = self.state.write().await;
        state.notifications.clear();
        self.publish(&state);
    }

    /// Drops everything, including stats and pending sync ids (sign-out)
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = StoreState::default();
        self.publish(&state);
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Notification> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub async fn get_unread_notifications(&self) -> Vec<Notification> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| !n.read)
            .cloned()
            .collect()
    }

    pub async fn unread_count(&self) -> usize {
        self.state.read().await.unread_count()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.notifications.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Badge feed: the current unread count, updated after every mutation
    pub fn subscribe_unread(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    pub async fn stats(&self) -> Option<NotificationStats> {
        self.state.read().await.stats.clone()
    }

    pub async fn set_stats(&self, stats: NotificationStats) {
        self.state.write().await.stats = Some(stats);
    }

    // ========================================================================
    // Pending server sync for optimistic read changes
    // ========================================================================

    pub async fn mark_pending<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.state.write().await.pending_sync.extend(ids);
    }

    pub async fn resolve_pending(&self, ids: &[String]) {
        let mut state = self.state.write().await;
        for id in ids {
            state.pending_sync.remove(id);
        }
    }

    /// Ids whose read change has not been confirmed by the server yet, sorted
    pub async fn pending_sync_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.read().await.pending_sync.iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
