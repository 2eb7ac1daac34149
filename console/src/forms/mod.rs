//! Client-side form validation and submission bookkeeping.
//!
//! DESIGN
//! ======
//! Each form validates into [`ValidationErrors`], a per-field message map
//! the front end renders inline next to the offending input. Nothing is sent
//! to the backend until validation passes. [`InFlight`] stops a form from
//! being submitted twice while its first request is still pending.


pub mod admin;
pub mod media;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::error::ApiError;

pub use admin::{InviteForm, LiveStartForm, NotificationForm};
pub use media::{AudioForm, EventForm, PostForm, SermonForm};

pub const MB: usize = 1024 * 1024;
pub const AUDIO_MAX_BYTES: usize = 100 * MB;
pub const IMAGE_MAX_BYTES: usize = 10 * MB;
pub const PDF_MAX_BYTES: usize = 50 * MB;
pub const VIDEO_MAX_BYTES: usize = 100 * MB;

/// Whether a form creates a new record or edits an existing one. Required
/// uploads are only enforced on create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Field name -> message. Ordered so rendering is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// RULES
// =============================================================================

pub(crate) fn require_min_chars(errors: &mut ValidationErrors, field: &'static str, value: &str, min: usize, label: &str) {
    if value.trim().chars().count() < min {
        errors.add(field, format!("{label} must be at least {min} characters"));
    }
}

pub(crate) fn require_present(errors: &mut ValidationErrors, field: &'static str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    }
}

pub(crate) fn limit_size(errors: &mut ValidationErrors, field: &'static str, upload: &Upload, max: usize, label: &str) {
    if upload.size() > max {
        errors.add(field, format!("{label} must not exceed {} MB", max / MB));
    }
}

/// Loose address check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Accept absolute http(s) URLs with a host.
#[must_use]
pub fn is_valid_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(raw).is_ok_and(|url| is_http_with_host(&url))
}

pub(crate) fn is_http_with_host(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|host| !host.is_empty())
}

// =============================================================================
// UPLOADS
// =============================================================================

/// A file selected for upload, held in memory so it can be re-sent.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    /// Wrap in-memory bytes, guessing the content type from the file name.
    #[must_use]
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Self {
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self { file_name: file_name.to_owned(), content_type, bytes }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upload`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ApiError::Upload { path: path.display().to_string(), source })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::from_bytes(&file_name, bytes))
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_content_type(&self, accepted: &[&str]) -> bool {
        accepted.iter().any(|t| self.content_type.eq_ignore_ascii_case(t))
    }
}

// =============================================================================
// IN-FLIGHT FLAG
// =============================================================================

/// Per-form "submission pending" flag.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

/// Clears the owning [`InFlight`] flag when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl InFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the flag, or `None` if a submission is already pending.
    #[must_use]
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    /// Run `submission` unless another one is pending.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InFlight`] without polling `submission` when the
    /// form is busy; otherwise whatever `submission` returns.
    pub async fn submit<T, F>(&self, submission: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let Some(_guard) = self.try_begin() else {
            return Err(ApiError::InFlight);
        };
        submission.await
    }
}
