use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::{EnrollmentId, StudentId};

use crate::middleware::auth::{
    RequireEnrollmentsCreate, RequireEnrollmentsRead, RequireEnrollmentsUpdate,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollments::model::{
    CompleteEnrollmentDto, EnrollStudentDto, Enrollment, EnrollmentFilterParams,
    PaginatedEnrollmentsResponse,
};
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Enroll a student in a subject
#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = EnrollStudentDto,
    responses(
        (status = 201, description = "Enrollment created", body = Enrollment),
        (status = 200, description = "Enrollment already existed", body = Enrollment),
        (status = 404, description = "Student or subject not found", body = ErrorResponse),
        (status = 422, description = "Student has no academic year", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn enroll_student(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsCreate,
    ValidatedJson(dto): ValidatedJson<EnrollStudentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let (enrollment, created) = EnrollmentService::enroll(&state.db, dto).await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(enrollment)))
}

/// List enrollments
#[utoipa::path(
    get,
    path = "/api/enrollments",
    responses(
        (status = 200, description = "Paginated enrollments", body = PaginatedEnrollmentsResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsRead,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<PaginatedEnrollmentsResponse>, AppError> {
    let response = EnrollmentService::get_enrollments(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get an enrollment by ID
#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment found", body = Enrollment),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsRead,
    Path(enrollment_id): Path<EnrollmentId>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::get_enrollment_by_id(&state.db, enrollment_id).await?;

    Ok(Json(enrollment))
}

/// List all enrollments for a student
#[utoipa::path(
    get,
    path = "/api/enrollments/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student enrollments", body = Vec<Enrollment>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_enrollments(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsRead,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = EnrollmentService::get_student_enrollments(&state.db, student_id).await?;

    Ok(Json(enrollments))
}

/// Complete an enrollment, optionally with a final grade
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/complete",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    request_body = CompleteEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment completed", body = Enrollment),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 409, description = "Enrollment not active", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn complete_enrollment(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsUpdate,
    Path(enrollment_id): Path<EnrollmentId>,
    ValidatedJson(dto): ValidatedJson<CompleteEnrollmentDto>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::complete(&state.db, enrollment_id, dto).await?;

    Ok(Json(enrollment))
}

/// Drop an enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/drop",
    params(("id" = EnrollmentId, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment dropped", body = Enrollment),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 409, description = "Enrollment not active", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn drop_enrollment(
    State(state): State<AppState>,
    _auth: RequireEnrollmentsUpdate,
    Path(enrollment_id): Path<EnrollmentId>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::drop(&state.db, enrollment_id).await?;

    Ok(Json(enrollment))
}
