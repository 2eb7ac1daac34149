//! `/sermons`: sermon notes (cover image + PDF).

use serde_json::Value;

use super::{ListQuery, contains_term, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::forms::{FormMode, SermonForm};
use crate::models::Sermon;
use crate::net::client::{ApiClient, ApiRequest};

/// Sermons are browsed by year, optionally narrowed to one month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SermonQuery {
    pub year: i32,
    pub month: Option<u8>,
}

impl SermonQuery {
    /// The current calendar year, all months.
    #[must_use]
    pub fn current_year() -> Self {
        Self { year: time::OffsetDateTime::now_utc().year(), month: None }
    }

    fn to_params(self) -> ListQuery {
        ListQuery::new()
            .set("year", self.year)
            .set_opt("month", self.month.filter(|m| (1..=12).contains(m)))
    }
}

pub struct Sermons<'a> {
    api: &'a ApiClient,
}

impl<'a> Sermons<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, query: SermonQuery) -> Result<Vec<Sermon>, ApiError> {
        let request = ApiRequest::get("/sermons").query(query.to_params().into_pairs());
        list_from(self.api.send_value(request).await?, "sermons")
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Sermon, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(record_path("/sermons", id)?)).await?, "sermon")
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn create(&self, form: &SermonForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Create)?;
        self.api.send_value(ApiRequest::post("/sermons").multipart(form.to_multipart())).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn update(&self, id: &str, form: &SermonForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Edit)?;
        self.api
            .send_value(ApiRequest::put(record_path("/sermons", id)?).json(form.to_update_json()))
            .await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::delete(record_path("/sermons", id)?)).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn increment_downloads(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::post(format!("{}/download", record_path("/sermons", id)?))).await
    }

    /// `GET /sermons/stats`, optionally for one year.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn stats(&self, year: Option<i32>) -> Result<Value, ApiError> {
        let params = ListQuery::new().set_opt("year", year);
        self.api
            .send_value(ApiRequest::get("/sermons/stats").query(params.into_pairs()))
            .await
    }
}

/// Client-side title search.
#[must_use]
pub fn search_sermons<'s>(sermons: &'s [Sermon], term: &str) -> Vec<&'s Sermon> {
    sermons.iter().filter(|s| contains_term(Some(&s.title), term)).collect()
}
