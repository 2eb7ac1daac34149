//! Credential endpoints consumed by the session store.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::models::SessionUser;
use crate::net::client::{ApiClient, ApiRequest};

/// Token and identity granted by a successful sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub user: SessionUser,
}

/// Backend operations the session store depends on.
///
/// The HTTP implementation is [`HttpAuthBackend`]; tests substitute fakes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError>;

    /// `GET /auth/me` with the current token.
    async fn me(&self) -> Result<SessionUser, ApiError>;

    /// `POST /auth/logout` with the current token.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /auth/resend-verification`
    async fn resend_verification(&self, email: &str) -> Result<(), ApiError>;
}

/// [`AuthBackend`] over the REST API.
#[derive(Clone)]
pub struct HttpAuthBackend {
    api: ApiClient,
}

impl HttpAuthBackend {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Deserialize)]
struct MeResponse {
    user: SessionUser,
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let request = ApiRequest::post("/auth/login")
            .json(json!({ "email": email, "password": password }))
            .without_refresh();
        self.api.send_json(request).await
    }

    async fn me(&self) -> Result<SessionUser, ApiError> {
        let body: MeResponse = self.api.send_json(ApiRequest::get("/auth/me")).await?;
        Ok(body.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.api
            .send_value(ApiRequest::post("/auth/logout").without_refresh())
            .await
            .map(|_| ())
    }

    async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post("/auth/resend-verification")
            .json(json!({ "email": email }))
            .without_refresh();
        self.api.send_value(request).await.map(|_| ())
    }
}
