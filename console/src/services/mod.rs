//! Typed wrappers over the backend's resource endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each submodule maps one resource to conventional REST calls through the
//! shared [`ApiClient`], so every call gets bearer auth and the 401 rule.
//! List endpoints answer with `{ "<plural>": [...] }`; single reads answer
//! with `{ "<singular>": {...} }` or the bare record. Create/update/delete
//! responses are returned as raw JSON since the console only echoes them.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod audios;
pub mod donations;
pub mod events;
pub mod live;
pub mod posts;
pub mod sermons;
pub mod stats;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::net::client::ApiClient;

pub use audios::{AudioQuery, Audios};
pub use donations::{DonationQuery, DonationSummary, Donations};
pub use events::{EventFilter, Events};
pub use live::Live;
pub use posts::{PostQuery, Posts};
pub use sermons::{SermonQuery, Sermons};
pub use stats::Stats;
pub use users::{UserQuery, Users};

impl ApiClient {
    #[must_use]
    pub fn audios(&self) -> Audios<'_> {
        Audios::new(self)
    }

    #[must_use]
    pub fn sermons(&self) -> Sermons<'_> {
        Sermons::new(self)
    }

    #[must_use]
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    #[must_use]
    pub fn posts(&self) -> Posts<'_> {
        Posts::new(self)
    }

    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    #[must_use]
    pub fn live(&self) -> Live<'_> {
        Live::new(self)
    }

    #[must_use]
    pub fn donations(&self) -> Donations<'_> {
        Donations::new(self)
    }

    #[must_use]
    pub fn stats(&self) -> Stats<'_> {
        Stats::new(self)
    }
}

// =============================================================================
// QUERY + PAGING
// =============================================================================

/// Ordered query-string builder for list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_owned(), value.to_string()));
        self
    }

    /// Add `key` only when a filter value is selected.
    #[must_use]
    pub fn set_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// One page of a paginated list.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    /// A full page suggests more records follow.
    pub has_more: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, limit: u32) -> Self {
        let has_more = limit > 0 && usize::try_from(limit).is_ok_and(|l| items.len() == l);
        Self { items, page, limit, has_more }
    }
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// Decode the list stored under `key`, accepting a bare array as well.
pub(crate) fn list_from<T: DeserializeOwned>(mut body: Value, key: &'static str) -> Result<Vec<T>, ApiError> {
    let items = if let Some(items) = body.get_mut(key) {
        items.take()
    } else if body.is_array() {
        body
    } else {
        return Err(ApiError::MissingField(key));
    };
    Ok(serde_json::from_value(items)?)
}

/// Path of one record under `collection`, with `id` as a single encoded
/// segment.
pub(crate) fn record_path(collection: &str, id: &str) -> Result<String, ApiError> {
    if id.trim().is_empty() || id == "." || id == ".." {
        return Err(ApiError::InvalidId(id.to_owned()));
    }
    Ok(format!("{collection}/{}", urlencoding::encode(id)))
}

/// Decode the record stored under `key`, falling back to the bare body.
pub(crate) fn one_from<T: DeserializeOwned>(mut body: Value, key: &'static str) -> Result<T, ApiError> {
    let record = match body.get_mut(key) {
        Some(record) if record.is_object() => record.take(),
        _ => body,
    };
    Ok(serde_json::from_value(record)?)
}

/// Case-insensitive substring match used by the client-side search boxes.
pub(crate) fn contains_term(haystack: Option<&str>, term: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&term.to_lowercase()))
}
