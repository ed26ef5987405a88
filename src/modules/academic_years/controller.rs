use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::AcademicYearId;

use crate::middleware::auth::{
    RequireAcademicYearsCreate, RequireAcademicYearsDelete, RequireAcademicYearsRead,
    RequireAcademicYearsSetCurrent, RequireAcademicYearsUpdate,
};
use crate::modules::academic_years::model::{
    AcademicYear, AcademicYearFilterParams, CreateAcademicYearDto, PaginatedAcademicYearsResponse,
    UpdateAcademicYearDto,
};
use crate::modules::academic_years::service::AcademicYearService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create an academic year
#[utoipa::path(
    post,
    path = "/api/academic-years",
    request_body = CreateAcademicYearDto,
    responses(
        (status = 201, description = "Academic year created", body = AcademicYear),
        (status = 409, description = "Name already in use", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsCreate,
    ValidatedJson(dto): ValidatedJson<CreateAcademicYearDto>,
) -> Result<(StatusCode, Json<AcademicYear>), AppError> {
    let year = AcademicYearService::create_academic_year(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(year)))
}

/// List academic years
#[utoipa::path(
    get,
    path = "/api/academic-years",
    responses(
        (status = 200, description = "Paginated academic years", body = PaginatedAcademicYearsResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_academic_years(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsRead,
    Query(filters): Query<AcademicYearFilterParams>,
) -> Result<Json<PaginatedAcademicYearsResponse>, AppError> {
    let response = AcademicYearService::get_academic_years(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get the current academic year
#[utoipa::path(
    get,
    path = "/api/academic-years/current",
    responses(
        (status = 200, description = "Current academic year", body = AcademicYear),
        (status = 404, description = "No current academic year", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_current_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsRead,
) -> Result<Json<AcademicYear>, AppError> {
    let year = AcademicYearService::get_current_academic_year(&state.db).await?;

    Ok(Json(year))
}

/// Get an academic year by ID
#[utoipa::path(
    get,
    path = "/api/academic-years/{id}",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year found", body = AcademicYear),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsRead,
    Path(year_id): Path<AcademicYearId>,
) -> Result<Json<AcademicYear>, AppError> {
    let year = AcademicYearService::get_academic_year_by_id(&state.db, year_id).await?;

    Ok(Json(year))
}

/// Update an academic year
#[utoipa::path(
    patch,
    path = "/api/academic-years/{id}",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    request_body = UpdateAcademicYearDto,
    responses(
        (status = 200, description = "Academic year updated", body = AcademicYear),
        (status = 404, description = "Academic year not found", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsUpdate,
    Path(year_id): Path<AcademicYearId>,
    ValidatedJson(dto): ValidatedJson<UpdateAcademicYearDto>,
) -> Result<Json<AcademicYear>, AppError> {
    let year = AcademicYearService::update_academic_year(&state.db, year_id, dto).await?;

    Ok(Json(year))
}

/// Mark an academic year as current
#[utoipa::path(
    post,
    path = "/api/academic-years/{id}/set-current",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year is now current", body = AcademicYear),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn set_current_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsSetCurrent,
    Path(year_id): Path<AcademicYearId>,
) -> Result<Json<AcademicYear>, AppError> {
    let year = AcademicYearService::set_current(&state.db, year_id).await?;

    Ok(Json(year))
}

/// Delete an academic year
#[utoipa::path(
    delete,
    path = "/api/academic-years/{id}",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 204, description = "Academic year deleted"),
        (status = 404, description = "Academic year not found", body = ErrorResponse),
        (status = 409, description = "Academic year still referenced", body = ErrorResponse)
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_academic_year(
    State(state): State<AppState>,
    _auth: RequireAcademicYearsDelete,
    Path(year_id): Path<AcademicYearId>,
) -> Result<StatusCode, AppError> {
    AcademicYearService::delete_academic_year(&state.db, year_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
