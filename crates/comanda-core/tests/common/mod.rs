//! In-process backend for driving the client end to end.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use comanda_core::{MemoryStorage, Navigator, SessionStore};

/// Observable state shared between a test and its backend.
pub struct BackendState {
    /// Access token the protected routes currently accept.
    pub accepted: Mutex<String>,
    /// Access token the refresh endpoint hands out next.
    pub next_access: Mutex<String>,
    /// Rotated refresh token, when the identity service rotates.
    pub next_refresh: Mutex<Option<String>>,
    /// Refresh token the refresh endpoint accepts.
    pub expected_refresh: Mutex<String>,
    /// Flip to make every refresh attempt fail.
    pub refresh_ok: AtomicBool,
    /// Server-side latency injected into the refresh endpoint.
    pub refresh_delay: Mutex<Duration>,
    pub refresh_calls: AtomicUsize,
    /// Authorization header observed on each protected-route hit.
    pub bearers: Mutex<Vec<Option<String>>>,
    /// `"METHOD path"` for every recorded hit.
    pub paths: Mutex<Vec<String>>,
    /// JSON bodies observed by the recording handler.
    pub bodies: Mutex<Vec<Value>>,
}

impl BackendState {
    pub fn new(accepted: &str, expected_refresh: &str) -> Arc<Self> {
        Arc::new(Self {
            accepted: Mutex::new(accepted.to_string()),
            next_access: Mutex::new("A2".to_string()),
            next_refresh: Mutex::new(None),
            expected_refresh: Mutex::new(expected_refresh.to_string()),
            refresh_ok: AtomicBool::new(true),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            bearers: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
        })
    }
}

/// Bind an ephemeral port and serve the router; returns the base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

pub async fn refresh_handler(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *state.refresh_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if !state.refresh_ok.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "refresh token invalid"})),
        )
            .into_response();
    }
    if body["refresh"].as_str() != Some(state.expected_refresh.lock().as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "unknown refresh token"})),
        )
            .into_response();
    }

    let access = state.next_access.lock().clone();
    *state.accepted.lock() = access.clone();
    let mut grant = json!({ "access": access });
    if let Some(rotated) = state.next_refresh.lock().clone() {
        *state.expected_refresh.lock() = rotated.clone();
        grant["refresh"] = json!(rotated);
    }
    Json(grant).into_response()
}

/// Accepts only the currently valid bearer token; records what it saw.
pub async fn protected_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Response {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    state.bearers.lock().push(bearer.clone());

    let expected = format!("Bearer {}", state.accepted.lock());
    if bearer.as_deref() == Some(expected.as_str()) {
        Json(json!({"ok": true})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "token expired"})),
        )
            .into_response()
    }
}

/// Records method, path and body, and answers `{"ok": true}`.
pub async fn recording_handler(
    State(state): State<Arc<BackendState>>,
    method: axum::http::Method,
    uri: Uri,
    body: axum::body::Bytes,
) -> Response {
    state.paths.lock().push(format!("{method} {}", uri.path()));
    if let Ok(body) = serde_json::from_slice::<Value>(&body) {
        state.bodies.lock().push(body);
    }
    Json(json!({"ok": true})).into_response()
}

/// Navigator that records whether the host was asked to show the login
/// surface.
#[derive(Default)]
pub struct RecordingNavigator {
    pub login_requested: AtomicBool,
}

impl Navigator for RecordingNavigator {
    fn goto_login(&self) {
        self.login_requested.store(true, Ordering::SeqCst);
    }
}

/// Session store over shared in-memory storage, so tests can inspect the
/// durable side too.
pub fn memory_session() -> (Arc<SessionStore>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::default());
    let store = SessionStore::open(Box::new(storage.clone())).expect("open session store");
    (Arc::new(store), storage)
}

/// A session already holding the A1/R1 token pair.
pub fn seeded_session() -> (Arc<SessionStore>, Arc<MemoryStorage>) {
    let (store, storage) = memory_session();
    store
        .login("A1".into(), "R1".into(), json!({"name": "Ana"}))
        .expect("seed session");
    (store, storage)
}
