use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::ClassId;

use crate::middleware::auth::{
    RequireClassesCreate, RequireClassesDelete, RequireClassesRead, RequireClassesUpdate,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::classes::model::{
    ClassFilterParams, CreateClassDto, PaginatedClassesResponse, SchoolClass, UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a class
#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = SchoolClass),
        (status = 404, description = "Academic year or teacher not found", body = ErrorResponse),
        (status = 409, description = "Duplicate grade level and section", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    _auth: RequireClassesCreate,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<SchoolClass>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(class)))
}

/// List classes
#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "Paginated classes", body = PaginatedClassesResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    _auth: RequireClassesRead,
    Query(filters): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let response = ClassService::get_classes(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get a class by ID
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class found", body = SchoolClass),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    _auth: RequireClassesRead,
    Path(class_id): Path<ClassId>,
) -> Result<Json<SchoolClass>, AppError> {
    let class = ClassService::get_class_by_id(&state.db, class_id).await?;

    Ok(Json(class))
}

/// Update a class
#[utoipa::path(
    patch,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = SchoolClass),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Duplicate grade level and section", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    _auth: RequireClassesUpdate,
    Path(class_id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<SchoolClass>, AppError> {
    let class = ClassService::update_class(&state.db, class_id, dto).await?;

    Ok(Json(class))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Class has students assigned", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    _auth: RequireClassesDelete,
    Path(class_id): Path<ClassId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_class(&state.db, class_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
