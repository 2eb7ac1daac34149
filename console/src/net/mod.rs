//! REST plumbing: the authorized HTTP client and the credential endpoints.

pub mod auth;
pub mod client;

pub use auth::{AuthBackend, HttpAuthBackend, LoginGrant};
pub use client::{ApiClient, ApiRequest, Body, FormPart, MultipartBody};
