//! # vof-console
//!
//! Client core for the Voice of Faith administration console.
//!
//! This crate holds everything a front end needs to drive the church media
//! backend: the session store and its persisted state, the authenticated
//! HTTP client with single refresh-and-replay on 401, the route guard, typed
//! entity services, form validation, and the theme preference. Front ends
//! (the `vof-admin` CLI today) only render and collect input.

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod net;
pub mod notice;
pub mod role;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use config::ConsoleConfig;
pub use error::{ApiError, ConfigError, StorageError};
pub use net::auth::{AuthBackend, HttpAuthBackend};
pub use net::client::ApiClient;
pub use notice::Notice;
pub use role::Role;
pub use routes::{GuardOutcome, Navigator, Route};
pub use state::auth::{Session, SessionHandle, SessionStore};
pub use state::theme::{Theme, ThemeStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
