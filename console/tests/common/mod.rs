//! In-process mock of the church backend, served by axum on a loopback port.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use vof_console::storage::AUTH_STORAGE_KEY;
use vof_console::{ApiClient, ConsoleConfig, KeyValueStore, MemoryStore, Route, SessionHandle, SharedStore};

/// One request as seen by the mock.
#[derive(Clone, Debug)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
    pub body: String,
}

pub struct Mock {
    pub valid_token: Mutex<String>,
    pub refresh_ok: AtomicBool,
    pub reject_all: AtomicBool,
    pub live: AtomicBool,
    pub hits: Mutex<Vec<Hit>>,
}

impl Default for Mock {
    fn default() -> Self {
        Self {
            valid_token: Mutex::new("tok-1".to_owned()),
            refresh_ok: AtomicBool::new(true),
            reject_all: AtomicBool::new(false),
            live: AtomicBool::new(false),
            hits: Mutex::new(Vec::new()),
        }
    }
}

impl Mock {
    pub fn hits_for(&self, method: &str, path: &str) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.method == method && h.path == path)
            .cloned()
            .collect()
    }
}

pub fn admin_json() -> Value {
    json!({ "id": "u1", "email": "admin@church.org", "displayName": "Admin", "role": "admin" })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn handle(State(mock): State<Arc<Mock>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().trim_start_matches("/api").to_owned();
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let body = String::from_utf8_lossy(&body).into_owned();
    mock.hits.lock().unwrap().push(Hit {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        auth: auth.clone(),
        body: body.clone(),
    });

    let expected = format!("Bearer {}", mock.valid_token.lock().unwrap());
    let authorized = !mock.reject_all.load(Ordering::SeqCst) && auth.as_deref() == Some(expected.as_str());

    match (method.as_str(), path.as_str()) {
        ("POST", "/auth/login") => {
            let creds: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            if creds["password"] == "secret" {
                let token = mock.valid_token.lock().unwrap().clone();
                reply(StatusCode::OK, json!({ "token": token, "user": admin_json() }))
            } else {
                reply(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid credentials" }))
            }
        }
        ("POST", "/auth/refresh") => {
            if mock.refresh_ok.load(Ordering::SeqCst) {
                *mock.valid_token.lock().unwrap() = "tok-2".to_owned();
                reply(StatusCode::OK, json!({ "token": "tok-2" }))
            } else {
                reply(StatusCode::UNAUTHORIZED, json!({ "message": "Refresh denied" }))
            }
        }
        _ if !authorized => reply(StatusCode::UNAUTHORIZED, json!({ "message": "Token expired" })),
        ("GET", "/auth/me") => reply(StatusCode::OK, json!({ "user": admin_json() })),
        ("POST", "/auth/logout") => reply(StatusCode::OK, json!({ "message": "Logged out" })),
        ("GET", "/audios") => reply(
            StatusCode::OK,
            json!({ "audios": [
                { "id": "a1", "title": "Morning prayer", "category": "teaching", "plays": 3 },
                { "id": "a2", "title": "Youth podcast", "category": "podcast" }
            ] }),
        ),
        ("POST", "/audios") => reply(StatusCode::CREATED, json!({ "message": "Audio created", "id": "a3" })),
        ("GET", "/admin/users") => reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "database down" })),
        ("GET", "/admin/live/status") => {
            reply(StatusCode::OK, json!({ "live": { "isLive": mock.live.load(Ordering::SeqCst) } }))
        }
        ("POST", "/admin/live/notify") => reply(StatusCode::OK, json!({ "sent": true })),
        ("GET", "/admin/donations/export") => {
            (StatusCode::OK, [(CONTENT_TYPE, "text/csv")], "Date,Donor\n01/03/2026,Ama\n").into_response()
        }
        _ => reply(StatusCode::NOT_FOUND, json!({ "message": "not found" })),
    }
}

/// Mock backend plus a client wired to it.
pub struct Harness {
    pub mock: Arc<Mock>,
    pub api: ApiClient,
    pub storage: SharedStore,
    pub navigations: Arc<Mutex<Vec<Route>>>,
}

impl Harness {
    pub fn session(&self) -> SessionHandle {
        self.api.session().clone()
    }

    pub fn navigations(&self) -> Vec<Route> {
        self.navigations.lock().unwrap().clone()
    }
}

/// Start the mock. With `persisted_token`, an admin session holding that
/// token is restored from storage, as if signed in on a previous run.
pub async fn harness(persisted_token: Option<&str>) -> Harness {
    let mock = Arc::new(Mock::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(handle).with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let storage: SharedStore = Arc::new(MemoryStore::new());
    if let Some(token) = persisted_token {
        let record = json!({ "token": token, "user": admin_json(), "isAuthenticated": true });
        storage.set(AUTH_STORAGE_KEY, &record.to_string()).unwrap();
    }

    let navigations = Arc::new(Mutex::new(Vec::new()));
    let recorder = navigations.clone();
    let navigator = Arc::new(move |route: Route| recorder.lock().unwrap().push(route));

    let config = ConsoleConfig::for_api(&format!("http://{addr}/api"), std::env::temp_dir()).unwrap();
    let api = ApiClient::new(&config, SessionHandle::restore(storage.clone()), navigator).unwrap();
    Harness { mock, api, storage, navigations }
}
