//! `/admin/stats`: dashboard aggregates. Payloads are shown as-is.

use serde_json::Value;

use crate::error::ApiError;
use crate::net::client::{ApiClient, ApiRequest};

pub struct Stats<'a> {
    api: &'a ApiClient,
}

impl<'a> Stats<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Dashboard counters, unwrapped from `{ "stats": {...} }` when enveloped.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn overview(&self) -> Result<Value, ApiError> {
        let mut body = self.api.send_value(ApiRequest::get("/admin/stats/overview")).await?;
        Ok(match body.get_mut("stats") {
            Some(stats) => stats.take(),
            None => body,
        })
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn audios(&self, query: Vec<(String, String)>) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::get("/admin/stats/audios").query(query)).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn users(&self) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::get("/admin/stats/users")).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn engagement(&self) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::get("/admin/stats/engagement")).await
    }
}
