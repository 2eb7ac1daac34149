//! Authorized HTTP client against the mock backend: bearer auth, the single
//! refresh-and-replay on 401, and forced logout.

mod common;

use vof_console::forms::{AudioForm, Upload};
use vof_console::models::AudioCategory;
use vof_console::services::AudioQuery;
use vof_console::{AuthBackend, HttpAuthBackend, Route, SessionStore};

#[tokio::test]
async fn requests_carry_bearer_token_and_list_params() {
    let h = common::harness(Some("tok-1")).await;
    let page = h.api.audios().list(AudioQuery { category: Some(AudioCategory::Podcast), ..AudioQuery::default() }).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(!page.has_more);
    let hits = h.mock.hits_for("GET", "/audios");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].auth.as_deref(), Some("Bearer tok-1"));
    assert_eq!(hits[0].query.as_deref(), Some("page=1&limit=20&category=podcast"));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_replayed_once() {
    let h = common::harness(Some("stale")).await;
    let page = h.api.audios().list(AudioQuery::default()).await.unwrap();
    assert_eq!(page.items[0].title, "Morning prayer");

    let hits = h.mock.hits_for("GET", "/audios");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].auth.as_deref(), Some("Bearer stale"));
    assert_eq!(hits[1].auth.as_deref(), Some("Bearer tok-2"));
    assert_eq!(h.mock.hits_for("POST", "/auth/refresh").len(), 1);

    assert_eq!(h.session().token().as_deref(), Some("tok-2"));
    assert_eq!(h.session().stored_token().as_deref(), Some("tok-2"));
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn second_401_forces_logout() {
    let h = common::harness(Some("stale")).await;
    h.mock.reject_all.store(true, std::sync::atomic::Ordering::SeqCst);

    let err = h.api.audios().list(AudioQuery::default()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(h.mock.hits_for("GET", "/audios").len(), 2);
    assert_eq!(h.mock.hits_for("POST", "/auth/refresh").len(), 1);

    assert!(!h.session().snapshot().is_authenticated);
    assert!(h.session().stored_token().is_none());
    assert_eq!(h.navigations(), [Route::Login]);
}

#[tokio::test]
async fn failed_refresh_forces_logout_without_replay() {
    let h = common::harness(Some("stale")).await;
    h.mock.refresh_ok.store(false, std::sync::atomic::Ordering::SeqCst);

    let err = h.api.audios().list(AudioQuery::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("Token expired"));
    assert_eq!(h.mock.hits_for("GET", "/audios").len(), 1);
    assert!(h.session().token().is_none());
    assert_eq!(h.navigations(), [Route::Login]);
}

#[tokio::test]
async fn other_errors_pass_through_with_server_message() {
    let h = common::harness(Some("tok-1")).await;
    let err = h.api.users().list(vof_console::services::UserQuery::default()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.server_message(), Some("database down"));
    assert_eq!(h.mock.hits_for("GET", "/admin/users").len(), 1);
    assert!(h.mock.hits_for("POST", "/auth/refresh").is_empty());
    assert!(h.session().snapshot().is_authenticated);
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn multipart_upload_is_replayed_after_refresh() {
    let h = common::harness(Some("stale")).await;
    let form = AudioForm {
        title: "Sunday sermon".to_owned(),
        description: None,
        category: AudioCategory::Teaching,
        audio: Some(Upload::from_bytes("sermon.mp3", vec![7; 64])),
        thumbnail: None,
    };
    h.api.audios().create(&form).await.unwrap();

    let hits = h.mock.hits_for("POST", "/audios");
    assert_eq!(hits.len(), 2);
    for hit in &hits {
        assert!(hit.body.contains("name=\"title\""));
        assert!(hit.body.contains("Sunday sermon"));
        assert!(hit.body.contains("filename=\"sermon.mp3\""));
    }
}

#[tokio::test]
async fn invalid_form_is_rejected_before_any_request() {
    let h = common::harness(Some("tok-1")).await;
    let err = h.api.audios().create(&AudioForm::default()).await.unwrap_err();
    assert!(matches!(err, vof_console::ApiError::Validation(_)));
    assert!(h.mock.hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn login_rejection_does_not_trigger_refresh() {
    let h = common::harness(None).await;
    let store = SessionStore::new(h.session(), HttpAuthBackend::new(h.api.clone()));

    store.login("admin@church.org", "wrong").await.unwrap_err();
    assert_eq!(store.snapshot().error.as_deref(), Some("Invalid credentials"));
    assert!(h.mock.hits_for("POST", "/auth/refresh").is_empty());
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn login_then_check_auth_then_logout() {
    let h = common::harness(None).await;
    let store = SessionStore::new(h.session(), HttpAuthBackend::new(h.api.clone()));

    store.login("admin@church.org", "secret").await.unwrap();
    assert_eq!(h.session().stored_token().as_deref(), Some("tok-1"));

    store.check_auth().await;
    assert!(store.snapshot().is_authenticated);
    assert_eq!(h.mock.hits_for("GET", "/auth/me")[0].auth.as_deref(), Some("Bearer tok-1"));

    store.logout().await;
    assert_eq!(h.mock.hits_for("POST", "/auth/logout").len(), 1);
    assert!(!store.snapshot().is_authenticated);
    assert!(h.session().stored_token().is_none());
}

#[tokio::test]
async fn check_auth_keeps_token_rotated_during_revalidation() {
    let h = common::harness(Some("stale")).await;
    let store = SessionStore::new(h.session(), HttpAuthBackend::new(h.api.clone()));

    store.check_auth().await;

    assert!(store.snapshot().is_authenticated);
    assert_eq!(h.mock.hits_for("POST", "/auth/refresh").len(), 1);
    let me = h.mock.hits_for("GET", "/auth/me");
    assert_eq!(me.len(), 2);
    assert_eq!(me[1].auth.as_deref(), Some("Bearer tok-2"));
    assert_eq!(h.session().token().as_deref(), Some("tok-2"));
    assert_eq!(h.session().stored_token().as_deref(), Some("tok-2"));
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn record_ids_cannot_leave_their_collection() {
    let h = common::harness(Some("tok-1")).await;

    let err = h.api.audios().delete("../admin/users").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(h.mock.hits_for("DELETE", "/admin/users").is_empty());
    assert_eq!(h.mock.hits_for("DELETE", "/audios/..%2Fadmin%2Fusers").len(), 1);

    let err = h.api.users().delete("..").await.unwrap_err();
    assert!(matches!(err, vof_console::ApiError::InvalidId(_)));
    assert_eq!(h.mock.hits.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn check_auth_without_token_stays_offline() {
    let h = common::harness(None).await;
    let backend = HttpAuthBackend::new(h.api.clone());
    let store = SessionStore::new(h.session(), backend);
    store.check_auth().await;
    assert!(h.mock.hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn me_returns_session_user() {
    let h = common::harness(Some("tok-1")).await;
    let user = HttpAuthBackend::new(h.api.clone()).me().await.unwrap();
    assert_eq!(user.role, vof_console::Role::Admin);
}
