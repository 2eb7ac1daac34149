//! Error types shared across the console crate.
//!
//! ERROR HANDLING
//! ==============
//! Every fallible operation returns one of these enums. The UI layer turns
//! them into a [`crate::notice::Notice`] instead of aborting; the worst
//! outcome of any failure is a forced return to the login screen.

use crate::forms::ValidationErrors;

/// Failure while reading or writing persisted client state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file or directory could not be accessed.
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A persisted value was not valid JSON for the expected shape.
    #[error("stored value for `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A key contained characters that cannot be mapped to a file name.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// Failure while building [`crate::config::ConsoleConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("no state directory available; set VOF_STATE_DIR")]
    NoStateDir,
}

/// Failure of a REST call or of a client-side precondition guarding one.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response envelope lacked the expected field.
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Client-side validation rejected the submission before any request.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// The same form already has a submission pending.
    #[error("a submission is already in progress")]
    InFlight,

    /// A record id that cannot stand as one path segment.
    #[error("invalid record id `{0}`")]
    InvalidId(String),

    /// Live notifications can only be pushed while a broadcast is running.
    #[error("no live broadcast is running")]
    NotLive,

    /// A local file selected for upload could not be read.
    #[error("cannot read upload `{path}`: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status carried by the error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message provided by the server for a failed response.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
