//! Tests for the service router: operation-to-backend binding, login/logout
//! flows, and profile mirroring.

mod common;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{any, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use comanda_core::{Config, Notifications, ServiceRouter, SessionStore};

use common::{
    memory_session, recording_handler, refresh_handler, spawn, BackendState, RecordingNavigator,
};

async fn login_handler(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.paths.lock().push("POST /id/api/auth/login/".into());
    state.bodies.lock().push(body);
    Json(json!({ "access": "A1", "refresh": "R1", "user": {"name": "Ana"} }))
}

async fn profile_handler(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.paths.lock().push("PATCH /id/api/auth/profile/".into());
    Json(body)
}

/// All three backends behind one server, told apart by path prefix.
fn pos_stack(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/id/api/auth/refresh/", post(refresh_handler))
        .route("/id/api/auth/login/", post(login_handler))
        .route("/id/api/auth/logout/", post(recording_handler))
        .route("/id/api/auth/profile/", patch(profile_handler))
        .route("/ops/api/inventory/products/", any(recording_handler))
        .route("/pos/api/tables/{id}/update_status/", any(recording_handler))
        .route("/pos/api/orders/orders/kds/", any(recording_handler))
        .with_state(state)
}

struct Harness {
    state: Arc<BackendState>,
    router: ServiceRouter,
    session: Arc<SessionStore>,
    notify: Notifications,
}

async fn harness(routes: fn(Arc<BackendState>) -> Router, seeded: bool) -> Harness {
    let state = BackendState::new("A1", "R1");
    let base = spawn(routes(state.clone())).await;

    let (session, _storage) = if seeded {
        common::seeded_session()
    } else {
        memory_session()
    };
    let notify = Notifications::new();
    let navigator = Arc::new(RecordingNavigator::default());

    let config = Config {
        gateway_url: String::new(),
        identity_url: format!("{base}/id"),
        operations_url: format!("{base}/ops"),
        pos_url: format!("{base}/pos"),
        use_gateway: false,
    };
    let router =
        ServiceRouter::new(&config, session.clone(), notify.clone(), navigator).expect("router");

    Harness {
        state,
        router,
        session,
        notify,
    }
}

#[tokio::test]
async fn login_stores_the_granted_session() {
    let h = harness(pos_stack, false).await;

    let session = h
        .router
        .login("ana@example.com", "secret")
        .await
        .expect("login");

    assert!(session.is_authenticated());
    assert_eq!(session.access_token.as_deref(), Some("A1"));
    assert_eq!(session.user, Some(json!({"name": "Ana"})));
    assert_eq!(h.session.current(), session);
    assert_eq!(
        h.state.bodies.lock().as_slice(),
        &[json!({"email": "ana@example.com", "password": "secret"})]
    );
}

#[tokio::test]
async fn rejected_login_leaves_the_session_untouched() {
    fn stack(state: Arc<BackendState>) -> Router {
        Router::new()
            .route(
                "/id/api/auth/login/",
                post(|| async {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"detail": "invalid credentials"})),
                    )
                }),
            )
            .with_state(state)
    }
    let h = harness(stack, false).await;

    let err = h
        .router
        .login("ana@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(!h.session.current().is_authenticated());

    let reported = h.notify.list();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].text, "invalid credentials");
}

#[tokio::test]
async fn logout_revokes_server_side_then_clears_locally() {
    let h = harness(pos_stack, true).await;

    h.router.logout().await.expect("logout");

    assert!(!h.session.current().is_authenticated());
    assert_eq!(
        h.state.paths.lock().as_slice(),
        &["POST /id/api/auth/logout/".to_string()]
    );
    assert_eq!(h.state.bodies.lock().as_slice(), &[json!({"refresh": "R1"})]);
}

#[tokio::test]
async fn logout_without_a_session_skips_revocation() {
    let h = harness(pos_stack, false).await;

    h.router.logout().await.expect("logout");

    assert!(h.state.paths.lock().is_empty());
    assert!(!h.session.current().is_authenticated());
}

#[tokio::test]
async fn logout_clears_locally_even_when_revocation_fails() {
    fn stack(state: Arc<BackendState>) -> Router {
        Router::new()
            .route(
                "/id/api/auth/logout/",
                post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .with_state(state)
    }
    let h = harness(stack, true).await;

    h.router.logout().await.expect("logout");
    assert!(!h.session.current().is_authenticated());
}

#[tokio::test]
async fn operations_are_routed_to_their_owning_backend() {
    let h = harness(pos_stack, true).await;

    h.router.products(&[]).await.expect("products");
    h.router
        .update_table_status(3, "occupied")
        .await
        .expect("table status");
    h.router.kitchen_orders().await.expect("kds");

    assert_eq!(
        h.state.paths.lock().as_slice(),
        &[
            "GET /ops/api/inventory/products/".to_string(),
            "POST /pos/api/tables/3/update_status/".to_string(),
            "GET /pos/api/orders/orders/kds/".to_string(),
        ]
    );
    assert_eq!(
        h.state.bodies.lock().as_slice(),
        &[json!({"status": "occupied"})]
    );
}

#[tokio::test]
async fn update_profile_mirrors_the_fresh_record_into_the_session() {
    let h = harness(pos_stack, true).await;

    h.router
        .update_profile(&json!({"name": "Benito"}))
        .await
        .expect("update profile");

    assert_eq!(h.session.current().user, Some(json!({"name": "Benito"})));
    assert_eq!(
        h.state.paths.lock().as_slice(),
        &["PATCH /id/api/auth/profile/".to_string()]
    );
}
