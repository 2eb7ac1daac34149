//! `/audios`: audio library.

use serde_json::Value;

use super::{ListQuery, Page, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::forms::{AudioForm, FormMode};
use crate::models::{Audio, AudioCategory};
use crate::net::client::{ApiClient, ApiRequest};

pub const DEFAULT_AUDIO_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<AudioCategory>,
}

impl Default for AudioQuery {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_AUDIO_PAGE_SIZE, category: None }
    }
}

pub struct Audios<'a> {
    api: &'a ApiClient,
}

impl<'a> Audios<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, query: AudioQuery) -> Result<Page<Audio>, ApiError> {
        let params = ListQuery::new()
            .set("page", query.page)
            .set("limit", query.limit)
            .set_opt("category", query.category.map(AudioCategory::as_str));
        let body = self.api.send_value(ApiRequest::get("/audios").query(params.into_pairs())).await?;
        Ok(Page::new(list_from(body, "audios")?, query.page, query.limit))
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Audio, ApiError> {
        let body = self.api.send_value(ApiRequest::get(record_path("/audios", id)?)).await?;
        one_from(body, "audio")
    }

    /// Upload a new audio. Validation runs before any request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn create(&self, form: &AudioForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Create)?;
        self.api.send_value(ApiRequest::post("/audios").multipart(form.to_multipart())).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn update(&self, id: &str, form: &AudioForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Edit)?;
        self.api
            .send_value(ApiRequest::put(record_path("/audios", id)?).json(form.to_update_json()))
            .await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::delete(record_path("/audios", id)?)).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn increment_plays(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::post(format!("{}/play", record_path("/audios", id)?))).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn increment_downloads(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::post(format!("{}/download", record_path("/audios", id)?))).await
    }
}
