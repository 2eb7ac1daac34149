use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::net::auth::LoginGrant;
use crate::storage::MemoryStore;

fn user(role: Role) -> SessionUser {
    SessionUser {
        id: "u1".to_owned(),
        email: "pastor@church.org".to_owned(),
        display_name: "Pastor".to_owned(),
        role,
    }
}

/// Scripted backend that counts every call.
#[derive(Default)]
struct FakeBackend {
    role: Option<Role>,
    reject_login: Option<ApiError>,
    fail_logout: bool,
    me_fails: bool,
    calls: AtomicUsize,
    seen: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    fn accepting(role: Role) -> Self {
        Self { role: Some(role), ..Self::default() }
    }

    fn record(&self, op: &'static str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(op);
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login(&self, _email: &str, password: &str) -> Result<LoginGrant, ApiError> {
        self.record("login");
        if let Some(ApiError::Status { status, message }) = &self.reject_login {
            return Err(ApiError::Status { status: *status, message: message.clone() });
        }
        if password != "secret" {
            return Err(ApiError::Status { status: 401, message: None });
        }
        Ok(LoginGrant { token: "tok-1".to_owned(), user: user(self.role.unwrap_or(Role::User)) })
    }

    async fn me(&self) -> Result<SessionUser, ApiError> {
        self.record("me");
        if self.me_fails {
            return Err(ApiError::Status { status: 401, message: None });
        }
        Ok(user(self.role.unwrap_or(Role::User)))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        if self.fail_logout {
            return Err(ApiError::Status { status: 500, message: Some("down".to_owned()) });
        }
        Ok(())
    }

    async fn resend_verification(&self, _email: &str) -> Result<(), ApiError> {
        self.record("resend");
        Ok(())
    }
}

fn store(backend: FakeBackend) -> (SessionStore<FakeBackend>, SharedStore) {
    let storage: SharedStore = Arc::new(MemoryStore::new());
    (SessionStore::new(SessionHandle::restore(storage.clone()), backend), storage)
}

// =============================================================
// Session snapshot
// =============================================================

#[test]
fn default_session_is_anonymous() {
    let session = Session::default();
    assert_eq!(session.status(), AuthStatus::Anonymous);
    assert!(session.role().is_none());
    assert!(!session.has_permission(Role::User));
}

#[test]
fn permission_follows_role_rank() {
    for (held, required, expected) in [
        (Role::Admin, Role::Media, true),
        (Role::Pasteur, Role::Media, true),
        (Role::Media, Role::Pasteur, false),
        (Role::User, Role::Media, false),
        (Role::Media, Role::Media, true),
    ] {
        let session = Session {
            user: Some(user(held)),
            token: Some("t".to_owned()),
            is_authenticated: true,
            ..Session::default()
        };
        assert_eq!(session.has_permission(required), expected, "{held} vs {required}");
    }
}

#[test]
fn unauthenticated_user_has_no_permission() {
    let session = Session { user: Some(user(Role::Admin)), ..Session::default() };
    assert!(!session.has_permission(Role::User));
}

// =============================================================
// Login / logout
// =============================================================

#[tokio::test]
async fn login_success_persists_and_restores() {
    let (store, storage) = store(FakeBackend::accepting(Role::Admin));
    let signed_in = store.login("pastor@church.org", "secret").await.unwrap();
    assert_eq!(signed_in.role, Role::Admin);

    let session = store.snapshot();
    assert_eq!(session.status(), AuthStatus::Authenticated);
    assert_eq!(session.token.as_deref(), Some("tok-1"));

    let restored = SessionHandle::restore(storage).snapshot();
    assert!(restored.is_authenticated);
    assert_eq!(restored.user, Some(user(Role::Admin)));
}

#[tokio::test]
async fn invalid_login_stays_anonymous_with_fallback_message() {
    let (store, storage) = store(FakeBackend::accepting(Role::Admin));
    let err = store.login("pastor@church.org", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());

    let session = store.snapshot();
    assert!(!session.is_authenticated);
    assert!(!session.loading);
    assert_eq!(session.error.as_deref(), Some(LOGIN_FAILED_MESSAGE));
    assert!(storage.get(AUTH_STORAGE_KEY).unwrap().is_none());
}

#[tokio::test]
async fn login_error_prefers_server_message() {
    let backend = FakeBackend {
        reject_login: Some(ApiError::Status { status: 403, message: Some("Account disabled".to_owned()) }),
        ..FakeBackend::default()
    };
    let (store, _) = store(backend);
    store.login("a@b.org", "secret").await.unwrap_err();
    assert_eq!(store.snapshot().error.as_deref(), Some("Account disabled"));
    assert_eq!(store.snapshot().status(), AuthStatus::Error);
}

#[tokio::test]
async fn logout_clears_even_when_server_fails() {
    let backend = FakeBackend { fail_logout: true, ..FakeBackend::accepting(Role::Media) };
    let (store, storage) = store(backend);
    store.login("a@b.org", "secret").await.unwrap();
    store.logout().await;

    assert_eq!(store.snapshot(), Session::default());
    assert!(storage.get(AUTH_STORAGE_KEY).unwrap().is_none());
    assert_eq!(*store.backend.seen.lock().unwrap(), ["login", "logout"]);
}

#[tokio::test]
async fn logout_without_token_skips_server() {
    let (store, _) = store(FakeBackend::accepting(Role::Media));
    store.logout().await;
    assert_eq!(store.backend.calls.load(Ordering::SeqCst), 0);
}

// =============================================================
// check_auth
// =============================================================

#[tokio::test]
async fn check_auth_without_stored_token_makes_no_call() {
    let (store, _) = store(FakeBackend::accepting(Role::Admin));
    store.check_auth().await;
    assert_eq!(store.backend.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.snapshot().status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn check_auth_revalidates_stored_session() {
    let (first, storage) = store(FakeBackend::accepting(Role::Pasteur));
    first.login("a@b.org", "secret").await.unwrap();

    let second = SessionStore::new(SessionHandle::restore(storage), FakeBackend::accepting(Role::Pasteur));
    second.check_auth().await;
    let session = second.snapshot();
    assert!(session.is_authenticated);
    assert_eq!(session.token.as_deref(), Some("tok-1"));
    assert!(second.has_permission(Role::Media));
    assert!(!second.has_permission(Role::Admin));
}

#[tokio::test]
async fn check_auth_clears_rejected_session() {
    let (first, storage) = store(FakeBackend::accepting(Role::Media));
    first.login("a@b.org", "secret").await.unwrap();

    let backend = FakeBackend { me_fails: true, ..FakeBackend::accepting(Role::Media) };
    let second = SessionStore::new(SessionHandle::restore(storage.clone()), backend);
    second.check_auth().await;
    assert_eq!(second.snapshot(), Session::default());
    assert!(storage.get(AUTH_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn corrupt_persisted_session_starts_anonymous() {
    let storage: SharedStore = Arc::new(MemoryStore::new());
    storage.set(AUTH_STORAGE_KEY, "not json").unwrap();
    let handle = SessionHandle::restore(storage.clone());
    assert_eq!(handle.snapshot(), Session::default());
    assert!(storage.get(AUTH_STORAGE_KEY).unwrap().is_none());
}

// =============================================================
// Subscribe / notify
// =============================================================

#[tokio::test]
async fn subscribers_observe_login_and_logout() {
    let (store, _) = store(FakeBackend::accepting(Role::Admin));
    let mut rx = store.subscribe();

    store.login("a@b.org", "secret").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated);

    store.logout().await;
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated);
}

#[tokio::test]
async fn resend_verification_delegates_to_backend() {
    let (store, _) = store(FakeBackend::default());
    store.resend_verification_email("a@b.org").await.unwrap();
    assert_eq!(*store.backend.seen.lock().unwrap(), ["resend"]);
}
