//! User CRUD handlers.
//!
//! HTTP-shape translation only: parse the path or body, hand the work to
//! the service with a request-scoped cancellation token, serialize the
//! result. The update route is decommissioned and not registered.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::NoContent;

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// User display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    #[schema(example = "Ann Example")]
    pub name: String,
    /// User email address
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user).delete(delete_user))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User does not exist"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let ctx = state.shutdown.child_token();
    let user = state.user_service.get_user(ctx, id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users/",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let ctx = state.shutdown.child_token();
    let user = state
        .user_service
        .create_user(ctx, payload.name, payload.email)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Delete a user by id
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User identifier")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User does not exist"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let ctx = state.shutdown.child_token();
    state.user_service.delete_user(ctx, id).await?;

    Ok(NoContent)
}
