// src/common/config.rs
//! Client configuration, loaded from the environment on top of built-in defaults

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub realtime_url: String,
    pub app_url: String,
    pub sign_in_path: String,
    pub data_dir: PathBuf,
    pub session_storage_key: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub reconnect_initial_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    pub reconnect_max_attempts: u32,
    pub desktop_notifications: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api/v1".to_string(),
            realtime_url: "ws://localhost:5000/ws".to_string(),
            app_url: "http://localhost:3000".to_string(),
            sign_in_path: "/sign-in".to_string(),
            data_dir: PathBuf::from("./.orgportal"),
            session_storage_key: "org-portal-session".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            reconnect_initial_delay_ms: 1_000,
            reconnect_max_delay_ms: 30_000,
            reconnect_max_attempts: 10,
            desktop_notifications: true,
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("PORTAL_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("PORTAL_REALTIME_URL") {
            config.realtime_url = url;
        }
        if let Ok(url) = env::var("PORTAL_APP_URL") {
            config.app_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = env::var("PORTAL_SIGN_IN_PATH") {
            config.sign_in_path = path;
        }
        if let Ok(dir) = env::var("PORTAL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(key) = env::var("PORTAL_SESSION_KEY") {
            if !key.trim().is_empty() {
                config.session_storage_key = key;
            }
        }

        override_parsed("PORTAL_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs);
        override_parsed("PORTAL_CONNECT_TIMEOUT_SECS", &mut config.connect_timeout_secs);
        override_parsed(
            "PORTAL_RECONNECT_INITIAL_DELAY_MS",
            &mut config.reconnect_initial_delay_ms,
        );
        override_parsed("PORTAL_RECONNECT_MAX_DELAY_MS", &mut config.reconnect_max_delay_ms);
        override_parsed("PORTAL_RECONNECT_MAX_ATTEMPTS", &mut config.reconnect_max_attempts);

        if let Ok(enabled) = env::var("PORTAL_DESKTOP_NOTIFICATIONS") {
            config.desktop_notifications = enabled.to_lowercase() != "false";
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Absolute URL of the sign-in screen, target of the unauthorized redirect
    pub fn sign_in_url(&self) -> String {
        let path = if self.sign_in_path.starts_with('/') {
            self.sign_in_path.clone()
        } else {
            format!("/{}", self.sign_in_path)
        };
        format!("{}{}", self.app_url.trim_end_matches('/'), path)
    }
}

fn override_parsed<T: FromStr>(var: &str, slot: &mut T) {
    if let Ok(raw) = env::var(var) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(variable = var, value = %raw, "Ignoring unparseable config value"),
        }
    }
}
