use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::UserId;

use crate::middleware::auth::{
    RequireUsersCreate, RequireUsersDelete, RequireUsersRead, RequireUsersUpdate,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a new user account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    _auth: RequireUsersCreate,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List users with optional role and active filters
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let response = UserService::get_users(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user_by_id(&state.db, user_id).await?;

    Ok(Json(user))
}

/// Update a user's profile or role
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path(user_id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_user(&state.db, user_id, dto).await?;

    Ok(Json(user))
}

/// Deactivate a user account
#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    _auth: RequireUsersDelete,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::deactivate_user(&state.db, user_id).await?;

    Ok(Json(user))
}

/// Reactivate a deactivated user account
#[utoipa::path(
    post,
    path = "/api/users/{id}/reactivate",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "User reactivated", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reactivate_user(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::reactivate_user(&state.db, user_id).await?;

    Ok(Json(user))
}
