//! Authorized REST client.
//!
//! DESIGN
//! ======
//! Every request goes through [`ApiClient::execute`], which:
//!
//! 1. attaches `Authorization: Bearer <token>` when the session holds one;
//! 2. on a 401 for a request that has not been retried, refreshes the token
//!    once (`POST /auth/refresh`) and replays the request;
//! 3. if the refresh fails or the replay is rejected again, clears the local
//!    session and navigates to the login screen, then returns the 401.
//!
//! Any other non-success status is returned untouched as
//! [`ApiError::Status`]. Bodies are described by [`Body`] rather than built
//! eagerly so that a multipart upload can be rebuilt for the replay.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::forms::Upload;
use crate::routes::{Navigator, Route};
use crate::state::auth::SessionHandle;

pub const REFRESH_PATH: &str = "/auth/refresh";

// =============================================================================
// REQUEST DESCRIPTION
// =============================================================================

/// One part of a multipart form.
#[derive(Clone, Debug, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

/// Replayable multipart/form-data body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.to_owned(), value: value.into() });
        self
    }

    /// Add a text field only when `value` is present and non-blank.
    #[must_use]
    pub fn text_opt(self, name: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    #[must_use]
    pub fn file(mut self, name: &str, upload: Upload) -> Self {
        self.parts.push(FormPart::File { name: name.to_owned(), upload });
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Value of the first text field called `name`.
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File { name, upload } => {
                    let file = reqwest::multipart::Part::bytes(upload.bytes.clone())
                        .file_name(upload.file_name.clone())
                        .mime_str(&upload.content_type)?;
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

/// A request to the REST API, relative to the configured base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    /// Whether a 401 may trigger the refresh-and-replay rule.
    pub refresh_on_401: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: Body::Empty, refresh_on_401: true }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    #[must_use]
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Body::Multipart(body);
        self
    }

    /// Exclude this request from refresh-and-replay (credential endpoints).
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_401 = false;
        self
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// REST client bound to a session and a navigator.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ConsoleConfig, session: SessionHandle, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()?;
        Ok(Self { http, base_url: config.api_url.clone(), session, navigator })
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send and decode the JSON response body into `T`.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.send_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send and return the JSON response body (`Null` when empty).
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn send_value(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = self.execute(&request).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.execute(&request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Run `request` with bearer auth and the single refresh-and-replay rule.
    async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let token = self.session.token();
        let response = self.dispatch(request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !request.refresh_on_401 {
            return ensure_success(response).await;
        }

        let original = status_error(response).await;
        tracing::debug!(method = %request.method, path = %request.path, "401 received; refreshing credentials");

        let fresh = match self.refresh_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(error = %e, "credential refresh failed");
                self.force_logout();
                return Err(original);
            }
        };

        let replay = self.dispatch(request, Some(&fresh)).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            let rejected = status_error(replay).await;
            self.force_logout();
            return Err(rejected);
        }
        ensure_success(replay).await
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response, ApiError> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, %url, "api request");

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token)?);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(body) => builder.multipart(body.to_form()?),
        };
        Ok(builder.send().await?)
    }

    /// Exchange the current token for a fresh one and store it.
    async fn refresh_token(&self) -> Result<String, ApiError> {
        let current = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .header(AUTHORIZATION, bearer(&current)?)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: Value = response.json().await?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingField("token"))?
            .to_owned();
        self.session.replace_token(token.clone());
        Ok(token)
    }

    /// Drop the local session without contacting the server and go to login.
    fn force_logout(&self) {
        tracing::warn!("session expired; returning to login");
        self.session.clear();
        self.navigator.navigate(Route::Login);
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn bearer(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

/// Convert a failed response into [`ApiError::Status`], keeping the server's
/// `message` (or `error`) field when the body is JSON.
async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    ApiError::Status { status, message: server_message(&text) }
}

pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}
