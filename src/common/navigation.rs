// src/common/navigation.rs
//! Location handling: where the user is and where they are sent

use reqwest::Url;
use std::sync::Mutex;
use tracing::info;

use super::ApiError;

/// Abstraction over the host's address bar
pub trait Navigator: Send + Sync {
    /// The location the application is currently showing
    fn current_url(&self) -> Url;

    /// In-app replacement of the location; no reload, no history entry
    fn replace_url(&self, url: Url);

    /// Full navigation; control leaves the application
    fn navigate_external(&self, url: Url);
}

/// Keeps the location in memory and records every full navigation
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<Url>,
    external: Mutex<Vec<Url>>,
}

impl MemoryNavigator {
    pub fn new(start: Url) -> Self {
        Self {
            current: Mutex::new(start),
            external: Mutex::new(Vec::new()),
        }
    }

    pub fn parse(start: &str) -> Result<Self, ApiError> {
        let url = Url::parse(start).map_err(|e| ApiError::Navigation(e.to_string()))?;
        Ok(Self::new(url))
    }

    /// Every URL passed to `navigate_external`, oldest first
    pub fn external_navigations(&self) -> Vec<Url> {
        self.external
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last_external(&self) -> Option<Url> {
        self.external_navigations().pop()
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        match self.current.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_url(&self, url: Url) {
        match self.current.lock() {
            Ok(mut guard) => *guard = url,
            Err(poisoned) => *poisoned.into_inner() = url,
        }
    }

    fn navigate_external(&self, url: Url) {
        info!(url = %url, "Navigating away from the application");
        if let Ok(mut history) = self.external.lock() {
            history.push(url.clone());
        }
        self.replace_url(url);
    }
}
