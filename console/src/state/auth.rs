//! Session store: authentication state plus login/logout/check.
//!
//! DESIGN
//! ======
//! [`SessionHandle`] is the state container. It wraps a `watch` channel so
//! any part of the console can subscribe to session changes, and it writes
//! the persisted subset (`token`, `user`, `isAuthenticated`) to client
//! storage on every authenticated transition. The HTTP client holds a handle
//! to read and rotate the bearer token.
//!
//! [`SessionStore`] adds the backend-facing operations on top of a handle.
//! It is constructed once by the front end and passed by reference; there is
//! no process-global session.
//!
//! State machine:
//!
//! ```text
//! anonymous --login/check--> loading --ok--> authenticated
//!                               |                 |
//!                               +--fail--> anonymous (error on login)
//! authenticated --logout / forced logout--> anonymous
//! ```

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::ApiError;
use crate::models::SessionUser;
use crate::net::auth::AuthBackend;
use crate::role::Role;
use crate::storage::{AUTH_STORAGE_KEY, SharedStore, load_json, save_json};

/// Fallback shown when a failed login carries no server message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// Coarse authentication status derived from a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Loading,
    Authenticated,
    Error,
}

/// Point-in-time view of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Loading
        } else if self.is_authenticated {
            AuthStatus::Authenticated
        } else if self.error.is_some() {
            AuthStatus::Error
        } else {
            AuthStatus::Anonymous
        }
    }

    /// Role of the signed-in user, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if !self.is_authenticated {
            return None;
        }
        self.user.as_ref().map(|u| u.role)
    }

    /// True iff someone is signed in and their role ranks at least `required`.
    #[must_use]
    pub fn has_permission(&self, required: Role) -> bool {
        self.role().is_some_and(|role| role.at_least(required))
    }
}

/// Subset of the session written to client storage.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<SessionUser>,
    #[serde(default)]
    is_authenticated: bool,
}

// =============================================================================
// SESSION HANDLE
// =============================================================================

/// Shared, cloneable session state container with subscribe/notify.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    tx: watch::Sender<Session>,
    storage: SharedStore,
}

impl SessionHandle {
    /// Build a handle, restoring any session persisted in `storage`.
    ///
    /// A corrupt record is discarded and the session starts anonymous.
    #[must_use]
    pub fn restore(storage: SharedStore) -> Self {
        let initial = match load_json::<PersistedSession>(storage.as_ref(), AUTH_STORAGE_KEY) {
            Ok(Some(saved)) => Session {
                is_authenticated: saved.is_authenticated && saved.token.is_some() && saved.user.is_some(),
                user: saved.user,
                token: saved.token,
                loading: false,
                error: None,
            },
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted session");
                if let Err(e) = storage.remove(AUTH_STORAGE_KEY) {
                    tracing::warn!(error = %e, "failed to remove persisted session");
                }
                Session::default()
            }
        };
        let (tx, _rx) = watch::channel(initial);
        Self { inner: Arc::new(HandleInner { tx, storage }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    /// Receive every subsequent session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }

    /// Bearer token currently held in memory.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.tx.borrow().token.clone()
    }

    /// Token found in durable storage, independent of in-memory state.
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        match load_json::<PersistedSession>(self.inner.storage.as_ref(), AUTH_STORAGE_KEY) {
            Ok(saved) => saved.and_then(|s| s.token).filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "persisted session unreadable");
                None
            }
        }
    }

    #[must_use]
    pub fn has_permission(&self, required: Role) -> bool {
        self.inner.tx.borrow().has_permission(required)
    }

    pub(crate) fn begin_loading(&self) {
        self.inner.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Mark the session authenticated and persist it.
    pub(crate) fn authenticate(&self, user: SessionUser, token: String) {
        tracing::debug!(user_id = %user.id, role = %user.role, "session authenticated");
        self.inner.tx.send_modify(|s| {
            *s = Session {
                user: Some(user),
                token: Some(token),
                is_authenticated: true,
                loading: false,
                error: None,
            };
        });
        self.persist();
    }

    /// Swap in a refreshed token, keeping the rest of the session.
    pub(crate) fn replace_token(&self, token: String) {
        self.inner.tx.send_modify(|s| s.token = Some(token));
        self.persist();
    }

    /// Record a failed attempt: unauthenticated, with `message` exposed.
    pub(crate) fn fail(&self, message: String) {
        self.inner.tx.send_modify(|s| {
            *s = Session { error: Some(message), ..Session::default() };
        });
        self.forget();
    }

    /// Drop all local session state, in memory and in storage.
    pub fn clear(&self) {
        self.inner.tx.send_modify(|s| *s = Session::default());
        self.forget();
    }

    fn persist(&self) {
        let saved = {
            let s = self.inner.tx.borrow();
            PersistedSession { token: s.token.clone(), user: s.user.clone(), is_authenticated: s.is_authenticated }
        };
        if let Err(e) = save_json(self.inner.storage.as_ref(), AUTH_STORAGE_KEY, &saved) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn forget(&self) {
        if let Err(e) = self.inner.storage.remove(AUTH_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted session");
        }
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Authentication operations bound to a session handle and a backend.
pub struct SessionStore<B> {
    handle: SessionHandle,
    backend: B,
}

impl<B: AuthBackend> SessionStore<B> {
    #[must_use]
    pub fn new(handle: SessionHandle, backend: B) -> Self {
        Self { handle, backend }
    }

    #[must_use]
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.handle.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.handle.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the credentials are rejected or the
    /// request fails. The session is left anonymous with the server message
    /// (or [`LOGIN_FAILED_MESSAGE`]) recorded as its error.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        self.handle.begin_loading();
        match self.backend.login(email, password).await {
            Ok(granted) => {
                tracing::info!(user_id = %granted.user.id, role = %granted.user.role, "signed in");
                self.handle.authenticate(granted.user.clone(), granted.token);
                Ok(granted.user)
            }
            Err(e) => {
                tracing::info!(error = %e, "sign-in rejected");
                let message = e.server_message().unwrap_or(LOGIN_FAILED_MESSAGE).to_owned();
                self.handle.fail(message);
                Err(e)
            }
        }
    }

    /// Sign out. The server call is best effort; local state is always cleared.
    pub async fn logout(&self) {
        if self.handle.token().is_some() {
            if let Err(e) = self.backend.logout().await {
                tracing::warn!(error = %e, "server-side logout failed; clearing local session anyway");
            }
        }
        self.handle.clear();
        tracing::info!("signed out");
    }

    /// Revalidate a stored session on start-up.
    ///
    /// Without a stored token the session becomes anonymous and no request is
    /// made. Any failure while revalidating clears the session.
    pub async fn check_auth(&self) {
        let Some(stored) = self.handle.stored_token() else {
            tracing::debug!("no stored session");
            self.handle.clear();
            return;
        };

        self.handle.begin_loading();
        match self.backend.me().await {
            Ok(user) => {
                // The HTTP layer may have rotated the token while revalidating.
                let token = self.handle.token().unwrap_or(stored);
                self.handle.authenticate(user, token);
            }
            Err(e) => {
                tracing::debug!(error = %e, "stored session rejected");
                self.handle.clear();
            }
        }
    }

    /// True iff the current role ranks at least `required`.
    #[must_use]
    pub fn has_permission(&self, required: Role) -> bool {
        self.handle.has_permission(required)
    }

    /// Ask the backend to resend the account verification email.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    pub async fn resend_verification_email(&self, email: &str) -> Result<(), ApiError> {
        self.backend.resend_verification(email).await
    }
}
