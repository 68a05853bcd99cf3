//! Integration tests for API endpoints.
//!
//! These tests dispatch real HTTP requests through the router with a mock
//! user service, so no database connection is required.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

use user_api::api::{create_router, AppState};
use user_api::domain::User;
use user_api::errors::{AppError, AppResult};
use user_api::infra::Database;
use user_api::services::UserService;

// =============================================================================
// Mock Service for Testing
// =============================================================================

/// In-memory user service backing the router under test.
///
/// Mirrors the service contract: NotFound for unknown ids, Conflict for
/// duplicate emails, store-style id/created_at assignment on create.
struct InMemoryUserService {
    users: Mutex<HashMap<Uuid, User>>,
    create_calls: AtomicUsize,
}

impl InMemoryUserService {
    fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn get_user(&self, _ctx: CancellationToken, id: Uuid) -> AppResult<User> {
        self.users
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn create_user(
        &self,
        _ctx: CancellationToken,
        name: String,
        email: String,
    ) -> AppResult<User> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::conflict("user with this email"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, _ctx: CancellationToken, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_state(service: Arc<InMemoryUserService>) -> AppState {
    let connection = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    AppState::new(
        service,
        Arc::new(Database::new(connection)),
        CancellationToken::new(),
    )
}

fn post_user(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/users/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// CRUD Scenario
// =============================================================================

#[tokio::test]
async fn test_create_get_delete_scenario() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service));

    // Create
    let response = app
        .clone()
        .oneshot(post_user(json!({"name": "Ann", "email": "ann@x.com"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "ann@x.com");
    let id = body["id"].as_str().expect("created user has an id").to_string();
    assert!(!id.is_empty());

    // Get returns the same fields
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "ann@x.com");

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone for good
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_user_returns_404() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_email_returns_409_and_keeps_first_user() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service));

    let response = app
        .clone()
        .oneshot(post_user(json!({"name": "Ann", "email": "ann@x.com"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_user(json!({"name": "Other Ann", "email": "ann@x.com"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");

    // First user is still retrievable, unchanged
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "Ann");
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_empty_name_is_rejected_before_service() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service.clone()));

    let response = app
        .oneshot(post_user(json!({"name": "", "email": "ann@x.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // The service was never invoked; no side effect on the store
    assert_eq!(service.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_email_is_rejected_before_service() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service.clone()));

    let response = app
        .oneshot(post_user(json!({"name": "Ann", "email": "not-an-email"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(service.create_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_update_route_is_not_registered() {
    let service = Arc::new(InMemoryUserService::new());
    let app = create_router(test_state(service));

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/users/{}", Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"name": "Ann"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_reports_database_status() {
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let state = AppState::new(
        Arc::new(InMemoryUserService::new()),
        Arc::new(Database::new(connection)),
        CancellationToken::new(),
    );
    let app = create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

// =============================================================================
// Error Responder
// =============================================================================

#[tokio::test]
async fn test_error_kinds_map_to_stable_status_codes() {
    use axum::response::IntoResponse;

    let cases = vec![
        (AppError::validation("name: must not be empty"), StatusCode::BAD_REQUEST),
        (AppError::NotFound, StatusCode::NOT_FOUND),
        (AppError::conflict("user with this email"), StatusCode::CONFLICT),
        (AppError::unavailable("connection refused"), StatusCode::SERVICE_UNAVAILABLE),
        (
            AppError::Database(sea_orm::DbErr::Custom("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (AppError::internal("unexpected"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_responder_never_leaks_store_detail() {
    use axum::response::IntoResponse;

    let error = AppError::Database(sea_orm::DbErr::Custom(
        "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
    ));
    let response = error.into_response();
    let body = json_body(response).await;

    let message = body["error"]["message"].as_str().unwrap();
    assert!(!message.contains("users_email_key"));
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}
