//! Transient user-facing messages (the console's toasts).

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::fmt;

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl NoticeLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    /// Error notice for a failed operation.
    ///
    /// Uses the server's message when the backend supplied one. Client-side
    /// failures describe themselves; anything else shows `fallback`.
    #[must_use]
    pub fn from_error(err: &ApiError, fallback: &str) -> Self {
        let message = match err {
            ApiError::Status { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            ApiError::Validation(_)
            | ApiError::InFlight
            | ApiError::NotLive
            | ApiError::InvalidId(_)
            | ApiError::NotAuthenticated
            | ApiError::Upload { .. } => err.to_string(),
            _ => fallback.to_owned(),
        };
        Self::error(message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}
