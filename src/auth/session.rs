//! Session state: who is signed in and with which token

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::User;
use crate::common::{safe_email_log, ApiError, LocalStorage};

/// `token` is present exactly when `user` is
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    fn is_consistent(&self) -> bool {
        self.user.is_some() == self.token.is_some()
    }
}

/// Cloneable handle to the current session, persisted across restarts
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    storage: Option<LocalStorage>,
    key: String,
}

impl SessionStore {
    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::default())),
            storage: None,
            key: String::new(),
        }
    }

    /// Restores the persisted session; corrupt or half-filled entries are discarded
    pub async fn load(storage: LocalStorage, key: &str) -> Self {
        let session = match storage.get_item(key).await {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) if session.is_consistent() => session,
                Ok(_) => {
                    warn!(key = %key, "Discarding persisted session with mismatched user/token");
                    Session::default()
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable persisted session");
                    Session::default()
                }
            },
            None => Session::default(),
        };

        if let Some(user) = &session.user {
            info!(email = %safe_email_log(&user.email), "Restored session");
        }

        Self {
            inner: Arc::new(RwLock::new(session)),
            storage: Some(storage),
            key: key.to_string(),
        }
    }

    /// Replaces the session. Anything short of a full user/token pair signs out.
    pub async fn set_user(&self, user: Option<User>, token: Option<String>) -> Result<(), ApiError> {
        let token = token.filter(|t| !t.is_empty());
        let session = match (user, token) {
            (Some(user), Some(token)) => Session {
                user: Some(user),
                token: Some(token),
            },
            (None, None) => Session::default(),
            _ => {
                warn!("set_user called with only one of user/token; clearing session");
                Session::default()
            }
        };

        *self.inner.write().await = session.clone();
        self.persist(&session).await
    }

    pub async fn clear_user(&self) -> Result<(), ApiError> {
        self.set_user(None, None).await
    }

    /// Edits the stored user in place; returns false when nobody is signed in
    pub async fn update_user<F>(&self, edit: F) -> Result<bool, ApiError>
    where
        F: FnOnce(&mut User),
    {
        let snapshot = {
            let mut session = self.inner.write().await;
            match session.user.as_mut() {
                Some(user) => edit(user),
                None => return Ok(false),
            }
            session.clone()
        };
        self.persist(&snapshot).await?;
        Ok(true)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    async fn persist(&self, session: &Session) -> Result<(), ApiError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        if session.is_authenticated() {
            let raw = serde_json::to_string(session)?;
            storage.set_item(&self.key, &raw).await?;
            debug!(key = %self.key, "Session persisted");
        } else {
            storage.remove_item(&self.key).await?;
            debug!(key = %self.key, "Persisted session removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@acme.io", id),
            first_name: Some("Ada".to_string()),
            last_name: None,
            role: Some("admin".to_string()),
            organisation_id: None,
            is_email_verified: true,
            two_factor_enabled: false,
            avatar: None,
        }
    }

    fn temp_storage() -> LocalStorage {
        LocalStorage::new(std::env::temp_dir().join(format!("orgportal-session-{}", uuid::Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_session_invariant() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated().await);

        store.set_user(Some(user("u1")), Some("tok".to_string())).await.unwrap();
        assert!(store.is_authenticated().await);

        store.set_user(None, None).await.unwrap();
        assert!(!store.is_authenticated().await);

        store.set_user(Some(user("u1")), Some("tok".to_string())).await.unwrap();
        store.clear_user().await.unwrap();
        assert!(!store.is_authenticated().await);
        assert_eq!(store.user().await, None);
        assert_eq!(store.token().await, None);
    }

    #[tokio::test]
    async fn test_half_filled_pair_signs_out() {
        let store = SessionStore::in_memory();
        store.set_user(Some(user("u1")), None).await.unwrap();
        assert!(!store.is_authenticated().await);
        assert_eq!(store.user().await, None);

        store.set_user(None, Some("tok".to_string())).await.unwrap();
        assert_eq!(store.token().await, None);

        store.set_user(Some(user("u1")), Some(String::new())).await.unwrap();
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_session_survives_reload() {
        let storage = temp_storage();
        let store = SessionStore::load(storage.clone(), "org-portal-session").await;
        store.set_user(Some(user("u2")), Some("tok-2".to_string())).await.unwrap();

        let reloaded = SessionStore::load(storage.clone(), "org-portal-session").await;
        assert!(reloaded.is_authenticated().await);
        assert_eq!(reloaded.user().await.unwrap().id, "u2");

        reloaded.clear_user().await.unwrap();
        let after_sign_out = SessionStore::load(storage.clone(), "org-portal-session").await;
        assert!(!after_sign_out.is_authenticated().await);

        let _ = tokio::fs::remove_dir_all(storage.dir()).await;
    }

    #[tokio::test]
    async fn test_load_discards_inconsistent_entry() {
        let storage = temp_storage();
        storage
            .set_item("org-portal-session", r#"{"user": null, "token": "orphan"}"#)
            .await
            .unwrap();

        let store = SessionStore::load(storage.clone(), "org-portal-session").await;
        assert!(!store.is_authenticated().await);
        assert_eq!(store.token().await, None);

        storage.set_item("org-portal-session", "not json").await.unwrap();
        let store = SessionStore::load(storage.clone(), "org-portal-session").await;
        assert!(!store.is_authenticated().await);

        let _ = tokio::fs::remove_dir_all(storage.dir()).await;
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = SessionStore::in_memory();
        assert!(!store
            .update_user(|u| u.organisation_id = Some("org-1".to_string()))
            .await
            .unwrap());

        store.set_user(Some(user("u3")), Some("tok".to_string())).await.unwrap();
        assert!(store
            .update_user(|u| u.organisation_id = Some("org-1".to_string()))
            .await
            .unwrap());
        assert!(store.user().await.unwrap().has_organisation());
    }
}
