// src/common/http.rs
//! Authenticated JSON client for the platform's REST API

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::PortalConfig;
use super::navigation::Navigator;
use super::ApiError;
use crate::auth::session::SessionStore;

/// Shared REST client.
///
/// Every call carries the session's bearer token when there is one. A 401 on
/// an authenticated call clears the session and sends the user to sign-in.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    sign_in_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &PortalConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sign_in_url: config.sign_in_url(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.http.request(Method::GET, self.url(path)), path)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.request(Method::POST, self.url(path)).json(body), path)
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.request(Method::PATCH, self.url(path)).json(body), path)
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.send(
            self.http.request(Method::POST, self.url(path)).multipart(form),
            path,
        )
        .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let token = self.session.token().await;
        let builder = match &token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(path = %path, status = %status, "API response");

        if status.as_u16() == 401 && token.is_some() {
            self.handle_unauthorized().await;
        }

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        decode_body(&body)
    }

    /// Global unauthorized path: forget the session and go to sign-in
    async fn handle_unauthorized(&self) {
        warn!("Session rejected by the server, signing out");
        if let Err(e) = self.session.clear_user().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        match Url::parse(&self.sign_in_url) {
            Ok(url) => self.navigator.navigate_external(url),
            Err(e) => warn!(url = %self.sign_in_url, error = %e, "Invalid sign-in URL"),
        }
    }
}

/// Decodes a response body, unwrapping a `{"data": ...}` envelope when the payload lives there
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };

    if let Some(data) = value.get("data") {
        if let Ok(inner) = serde_json::from_value::<T>(data.clone()) {
            return Ok(inner);
        }
    }

    serde_json::from_value::<T>(value).map_err(ApiError::from)
}
