//! `/posts`: social feed of image and video posts.

use serde_json::Value;

use super::{ListQuery, Page, list_from, one_from, record_path};
use crate::error::ApiError;
use crate::forms::{FormMode, PostForm};
use crate::models::{Post, PostCategory};
use crate::net::client::{ApiClient, ApiRequest};

pub const DEFAULT_POST_PAGE_SIZE: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<PostCategory>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_POST_PAGE_SIZE, category: None }
    }
}

pub struct Posts<'a> {
    api: &'a ApiClient,
}

impl<'a> Posts<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self, query: PostQuery) -> Result<Page<Post>, ApiError> {
        let params = ListQuery::new()
            .set("page", query.page)
            .set("limit", query.limit)
            .set_opt("category", query.category.map(PostCategory::as_str));
        let body = self.api.send_value(ApiRequest::get("/posts").query(params.into_pairs())).await?;
        Ok(Page::new(list_from(body, "posts")?, query.page, query.limit))
    }

    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Post, ApiError> {
        one_from(self.api.send_value(ApiRequest::get(record_path("/posts", id)?)).await?, "post")
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn create(&self, form: &PostForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Create)?;
        self.api.send_value(ApiRequest::post("/posts").multipart(form.to_multipart())).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid input, otherwise
    /// transport or status errors.
    pub async fn update(&self, id: &str, form: &PostForm) -> Result<Value, ApiError> {
        form.validate(FormMode::Edit)?;
        self.api
            .send_value(ApiRequest::put(record_path("/posts", id)?).json(form.to_update_json()))
            .await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::delete(record_path("/posts", id)?)).await
    }

    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn like(&self, id: &str) -> Result<Value, ApiError> {
        self.api.send_value(ApiRequest::post(format!("{}/like", record_path("/posts", id)?))).await
    }
}
