//! End-to-end tests of the session pipeline against a mock backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};

use frontdesk_core::auth::{FileStorage, MemoryStorage};
use frontdesk_core::models::Hotel;
use frontdesk_core::{ApiError, AppContext, Config, Navigation, RecordingNavigator, LOGIN_ROUTE};

/// Credential the mock backend treats as revoked
const REVOKED: &str = "revoked-on-server";

#[derive(Clone, Default)]
struct Backend {
    /// Authorization header of every request, in arrival order
    seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
    logout_fails: Arc<Mutex<bool>>,
}

impl Backend {
    fn record(&self, route: &str, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push((route.to_string(), auth));
    }

    fn auth_for(&self, route: &str) -> Vec<Option<String>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == route)
            .map(|(_, auth)| auth.clone())
            .collect()
    }
}

fn jwt(exp: i64) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"7","exp":{}}}"#, exp))
    )
}

fn user_json() -> Value {
    json!({
        "user_id": 7,
        "user_nm": "Ana Ruiz",
        "email": "ana@hotel.test",
        "password": "$2b$10$hash",
        "role_id": 1,
        "is_active": true
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": status.as_u16(), "message": message }))).into_response()
}

async fn login(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("login", &headers);
    if body["email"] == "ana@hotel.test" && body["password"] == "s3cret" {
        let token = format!("Bearer {}", jwt(Utc::now().timestamp() + 3600));
        Json(json!({ "token": token, "user": user_json() })).into_response()
    } else if body["email"] == "blank@hotel.test" {
        Json(json!({ "token": "Bearer ", "user": user_json() })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Credenciales inválidas")
    }
}

async fn logout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("logout", &headers);
    if *backend.logout_fails.lock().unwrap() {
        error(StatusCode::INTERNAL_SERVER_ERROR, "logout unavailable")
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn list_hotels(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("hotels", &headers);
    let revoked = format!("Bearer {}", REVOKED);
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(revoked.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Token");
    }
    Json(json!([
        { "hotel_id": 1, "hotel_name": "Casa Azul", "address": "Calle 5", "city": "Oaxaca", "country": "MX", "image_url": null },
        { "hotel_id": 2, "hotel_name": "Mar Verde", "address": "Av. 1", "city": "Cartagena", "country": "CO", "image_url": null }
    ]))
    .into_response()
}

async fn get_hotel(Path(id): Path<i64>) -> Response {
    if id == 1 {
        Json(json!({ "hotel_id": 1, "hotel_name": "Casa Azul", "city": "Oaxaca", "country": "MX" }))
            .into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Hotel no encontrado")
    }
}

async fn create_hotel(Json(mut body): Json<Value>) -> Response {
    body["hotel_id"] = json!(3);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_hotel(Path(id): Path<i64>, Json(mut body): Json<Value>) -> Response {
    body["hotel_id"] = json!(id);
    Json(body).into_response()
}

async fn delete_hotel() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn list_rooms() -> Response {
    error(StatusCode::UNAUTHORIZED, "Permisos insuficientes")
}

/// 401s that mention a token outside the `message` field
async fn list_users(Path(kind): Path<String>) -> Response {
    if kind == "plain" {
        return (StatusCode::UNAUTHORIZED, "Unauthorized: bearer token required").into_response();
    }
    let body = json!({ "error": "missing credentials", "hint": "send a token" });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

async fn kpi_values(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("kpis", &headers);
    Json(json!({
        "status": 200,
        "message": "ok",
        "data": { "reservationsCount": "12", "ocupationCount": "80%", "monthSummary": "$4,200", "pendingInvoices": "3" }
    }))
    .into_response()
}

async fn last_reservations() -> Response {
    Json(json!([{
        "reservation_id": 9, "reservation_number": "R-0009", "user_id": 7, "hotel_id": 1, "room_id": 4,
        "check_in": "2024-05-01", "check_out": "2024-05-03", "reservation_status_id": 2, "total": "240.00"
    }]))
    .into_response()
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/v1/users/login", post(login))
        .route("/api/v1/users/logout", post(logout))
        .route("/api/v1/hotel", get(list_hotels).post(create_hotel))
        .route(
            "/api/v1/hotel/{id}",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .route("/api/v1/rooms", get(list_rooms))
        .route("/api/v1/users/{kind}", get(list_users))
        .route("/api/v1/dashboard/kpi-values", get(kpi_values))
        .route("/api/v1/reservation/last-reservations", get(last_reservations))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

fn context_for(addr: SocketAddr) -> (AppContext, Arc<RecordingNavigator>) {
    let config = Config {
        api_url: format!("http://{}/api/v1", addr),
        ..Config::default()
    };
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = AppContext::new(config, Arc::new(MemoryStorage::new()), navigator.clone()).unwrap();
    (ctx, navigator)
}

#[tokio::test]
async fn test_login_stores_normalized_credential() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    // A stale credential must not be sent to the login endpoint
    ctx.session.set_credential(Some("stale".to_string()));

    let user = ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(backend.auth_for("login"), vec![None]);

    let session = ctx.session.snapshot();
    assert!(session.authenticated);
    assert_eq!(session.principal.as_ref().map(|p| p.email.as_str()), Some("ana@hotel.test"));
    let credential = session.credential.unwrap();
    assert!(!credential.starts_with("Bearer "));
    assert_eq!(credential.split('.').count(), 3);
    assert!(ctx.gateway.verify());
}

#[tokio::test]
async fn test_failed_login_propagates_and_keeps_session() {
    let (addr, _) = spawn_backend().await;
    let (ctx, navigator) = context_for(addr);

    let err = ctx.gateway.login("ana@hotel.test", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Credenciales inválidas"));
    assert!(!ctx.session.is_authenticated());
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_requests_carry_exact_stored_credential() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    let credential = ctx.session.credential().unwrap();

    let hotels: Vec<Hotel> = ctx.transport.hotels().list().await.unwrap();
    assert_eq!(hotels.len(), 2);
    ctx.transport.kpi_values().await.unwrap();

    let expected = Some(format!("Bearer {}", credential));
    assert_eq!(backend.auth_for("hotels"), vec![expected.clone()]);
    assert_eq!(backend.auth_for("kpis"), vec![expected]);
}

#[tokio::test]
async fn test_no_credential_means_no_header() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    ctx.transport.hotels().list().await.unwrap();
    assert_eq!(backend.auth_for("hotels"), vec![None]);
}

#[tokio::test]
async fn test_credential_read_at_call_time() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    // The handle is created before any credential exists
    let hotels = ctx.transport.hotels();
    ctx.session.set_credential(Some("first".to_string()));
    hotels.list().await.unwrap();
    ctx.session.set_credential(Some("second".to_string()));
    hotels.list().await.unwrap();

    assert_eq!(
        backend.auth_for("hotels"),
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn test_token_rejection_logs_out_and_navigates() {
    let (addr, _) = spawn_backend().await;
    let (ctx, navigator) = context_for(addr);
    ctx.session.set_credential(Some(REVOKED.to_string()));

    let err = ctx.transport.hotels().list().await.unwrap_err();
    assert!(err.is_auth_rejected());
    assert_eq!(err.message(), Some("Invalid Token"));

    assert_eq!(ctx.session.snapshot(), Default::default());
    assert_eq!(navigator.visits(), vec![Navigation::Reload(LOGIN_ROUTE.to_string())]);
    assert!(!ctx.gateway.verify());
}

#[tokio::test]
async fn test_concurrent_rejections_are_idempotent() {
    let (addr, _) = spawn_backend().await;
    let (ctx, navigator) = context_for(addr);
    ctx.session.set_credential(Some(REVOKED.to_string()));

    let hotels = ctx.transport.hotels();
    let (a, b) = tokio::join!(hotels.list(), hotels.list());
    assert!(a.unwrap_err().is_auth_rejected());
    // The second request may already have gone out without a credential
    let _ = b;

    assert!(!ctx.session.is_authenticated());
    assert!(navigator.forced_login());
}

#[tokio::test]
async fn test_other_401_keeps_session() {
    let (addr, _) = spawn_backend().await;
    let (ctx, navigator) = context_for(addr);
    ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();

    let err = ctx.transport.rooms().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert!(ctx.session.is_authenticated());
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_token_outside_message_field_keeps_session() {
    let (addr, _) = spawn_backend().await;
    let (ctx, navigator) = context_for(addr);
    ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    let before = ctx.session.snapshot();

    let users = ctx.transport.users();
    for kind in ["plain", "json"] {
        let err = users.get(kind).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)), "{}", kind);
    }
    assert_eq!(ctx.session.snapshot(), before);
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_login_with_empty_credential_fails() {
    let (addr, _) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    let err = ctx.gateway.login("blank@hotel.test", "s3cret").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert_eq!(ctx.session.snapshot(), Default::default());
    assert!(!ctx.gateway.verify());
}

#[tokio::test]
async fn test_errors_reach_caller() {
    let (addr, _) = spawn_backend().await;
    let (ctx, _) = context_for(addr);

    let err = ctx.transport.hotels().get(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Hotel no encontrado"));

    let hotel = ctx.transport.hotels().get(1).await.unwrap();
    assert_eq!(hotel.location(), "Oaxaca, MX");
}

#[tokio::test]
async fn test_crud_roundtrip() {
    let (addr, _) = spawn_backend().await;
    let (ctx, _) = context_for(addr);
    let hotels = ctx.transport.hotels();

    let created = hotels
        .create(&json!({ "hotel_name": "Nuevo", "city": "Lima", "country": "PE" }))
        .await
        .unwrap();
    assert_eq!(created.hotel_id, 3);

    let updated = hotels
        .update(5, &json!({ "hotel_name": "Renombrado" }))
        .await
        .unwrap();
    assert_eq!(updated.hotel_id, 5);
    assert_eq!(updated.hotel_name, "Renombrado");

    hotels.delete(5).await.unwrap();

    let recent = ctx.transport.last_reservations().await.unwrap();
    assert_eq!(recent[0].total, 240.0);
}

#[tokio::test]
async fn test_network_error_leaves_session_alone() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (ctx, navigator) = context_for(addr);
    ctx.session.set_credential(Some("abc".to_string()));

    let err = ctx.transport.hotels().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(ctx.session.credential().as_deref(), Some("abc"));
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_even_when_remote_fails() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);
    ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    *backend.logout_fails.lock().unwrap() = true;

    let err = ctx.gateway.logout().await.unwrap_err();
    assert!(matches!(err, ApiError::ServerError(_)));
    assert_eq!(ctx.session.snapshot(), Default::default());
}

#[tokio::test]
async fn test_logout_sends_credential_then_clears() {
    let (addr, backend) = spawn_backend().await;
    let (ctx, _) = context_for(addr);
    ctx.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    let credential = ctx.session.credential().unwrap();

    ctx.gateway.logout().await.unwrap();
    assert_eq!(backend.auth_for("logout"), vec![Some(format!("Bearer {}", credential))]);
    assert!(!ctx.session.is_authenticated());

    // Logging out again still succeeds remotely and stays logged out
    ctx.gateway.logout().await.unwrap();
    assert_eq!(backend.auth_for("logout").last(), Some(&None));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let (addr, _) = spawn_backend().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        api_url: format!("http://{}/api/v1", addr),
        ..Config::default()
    };

    let first = AppContext::new(
        config.clone(),
        Arc::new(FileStorage::new(tmp.path().to_path_buf())),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    first.gateway.login("ana@hotel.test", "s3cret").await.unwrap();
    let persisted = first.session.snapshot();

    let second = AppContext::new(
        config,
        Arc::new(FileStorage::new(tmp.path().to_path_buf())),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    assert_eq!(second.session.snapshot(), persisted);
    assert!(second.guard.render(|| ()).view().is_some());
}
