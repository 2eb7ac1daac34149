//! `/admin/live`: the live broadcast flag and its push notification.

use serde_json::{Value, json};

use super::one_from;
use crate::error::ApiError;
use crate::forms::{LiveStartForm, NotificationForm};
use crate::models::LiveStatus;
use crate::net::client::{ApiClient, ApiRequest};

const STATUS_PATH: &str = "/admin/live/status";
const NOTIFY_PATH: &str = "/admin/live/notify";

pub struct Live<'a> {
    api: &'a ApiClient,
}

impl<'a> Live<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn status(&self) -> Result<LiveStatus, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(STATUS_PATH)).await?, "live")
    }

    /// Go live with a title and a YouTube link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn start(&self, form: &LiveStartForm) -> Result<Value, ApiError> {
        form.validate()?;
        tracing::info!(title = %form.title.trim(), "live: starting broadcast");
        self.api.send_value(ApiRequest::put(STATUS_PATH).json(form.to_json())).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn stop(&self) -> Result<Value, ApiError> {
        tracing::info!("live: stopping broadcast");
        self.api.send_value(ApiRequest::put(STATUS_PATH).json(json!({ "isLive": false }))).await
    }

    /// Push a notification to app users. The current status is fetched first
    /// and nothing is sent unless a broadcast is running.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input,
    /// [`ApiError::NotLive`] when off air, otherwise transport or status errors.
    pub async fn notify(&self, form: &NotificationForm) -> Result<Value, ApiError> {
        form.validate()?;
        if !self.status().await?.is_live {
            return Err(ApiError::NotLive);
        }
        self.api.send_value(ApiRequest::post(NOTIFY_PATH).json(form.to_json())).await
    }
}
