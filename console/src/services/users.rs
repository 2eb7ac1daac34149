//! `/admin/users`: staff accounts and invitations.

use serde_json::{Value, json};

use super::{ListQuery, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::forms::InviteForm;
use crate::models::AdminUser;
use crate::net::client::{ApiClient, ApiRequest};
use crate::role::Role;

pub const DEFAULT_USER_PAGE_SIZE: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserQuery {
    pub limit: u32,
    pub role: Option<Role>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self { limit: DEFAULT_USER_PAGE_SIZE, role: None }
    }
}

pub struct Users<'a> {
    api: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Send an invitation email. Validation runs before any request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn invite(&self, form: &InviteForm) -> Result<Value, ApiError> {
        form.validate()?;
        tracing::info!(role = %form.role, "users: sending invitation");
        self.api.send_value(ApiRequest::post("/admin/users/invite").json(form.to_json())).await
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, query: UserQuery) -> Result<Vec<AdminUser>, ApiError> {
        let params = ListQuery::new().set("limit", query.limit).set_opt("role", query.role.map(Role::as_str));
        let body = self
            .api
            .send_value(ApiRequest::get("/admin/users").query(params.into_pairs()))
            .await?;
        list_from(body, "users")
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<AdminUser, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(record_path("/admin/users", id)?)).await?, "user")
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn update_role(&self, id: &str, role: Role) -> Result<Value, ApiError> {
        let path = format!("{}/role", record_path("/admin/users", id)?);
        self.api.send_value(ApiRequest::put(path).json(json!({ "role": role.as_str() }))).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn resend_invitation(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::post(format!("{}/resend", record_path("/admin/users", id)?))).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::delete(record_path("/admin/users", id)?)).await
    }
}
