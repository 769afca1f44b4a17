// Test-only helpers: an in-process API server and a client pointed at it

use std::sync::Arc;

use super::{ApiClient, MemoryNavigator, PortalConfig};
use crate::auth::models::User;
use crate::auth::session::SessionStore;

/// Serves `router` on an ephemeral port and returns its base URL
pub async fn spawn_api(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}

pub fn test_config(base_url: &str) -> PortalConfig {
    PortalConfig {
        api_base_url: base_url.to_string(),
        app_url: "http://localhost:3000".to_string(),
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        ..PortalConfig::default()
    }
}

pub fn test_client(base_url: &str, session: SessionStore) -> (ApiClient, Arc<MemoryNavigator>) {
    let navigator = Arc::new(
        MemoryNavigator::parse("http://localhost:3000/dashboard").expect("start url"),
    );
    let client = ApiClient::new(&test_config(base_url), session, navigator.clone())
        .expect("api client");
    (client, navigator)
}

pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@acme.io", id),
        first_name: Some("Grace".to_string()),
        last_name: Some("Hopper".to_string()),
        role: Some("admin".to_string()),
        organisation_id: Some("org-1".to_string()),
        is_email_verified: true,
        two_factor_enabled: false,
        avatar: None,
    }
}

pub async fn signed_in_session(id: &str) -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .set_user(Some(sample_user(id)), Some(format!("token-{}", id)))
        .await
        .expect("set session");
    session
}
