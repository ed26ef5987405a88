use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::{SubjectId, TeacherId};

use crate::middleware::auth::{
    RequireTeachersAssign, RequireTeachersCreate, RequireTeachersRead, RequireTeachersUpdate,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::teachers::model::{
    AssignClassDto, AssignSubjectDto, CanTeachResponse, ClassAssignment, CreateTeacherDto,
    PaginatedTeachersResponse, SubjectAssignment, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a teacher with their user account
#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    _auth: RequireTeachersCreate,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(teacher)))
}

/// List teachers
#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "Paginated teachers", body = PaginatedTeachersResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    _auth: RequireTeachersRead,
    Query(filters): Query<TeacherFilterParams>,
) -> Result<Json<PaginatedTeachersResponse>, AppError> {
    let response = TeacherService::get_teachers(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get a teacher by ID
#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher found", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    _auth: RequireTeachersRead,
    Path(teacher_id): Path<TeacherId>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::get_teacher_by_id(&state.db, teacher_id).await?;

    Ok(Json(teacher))
}

/// Update a teacher's profile
#[utoipa::path(
    patch,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    _auth: RequireTeachersUpdate,
    Path(teacher_id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::update_teacher(&state.db, teacher_id, dto).await?;

    Ok(Json(teacher))
}

/// Assign a subject to a teacher
#[utoipa::path(
    post,
    path = "/api/teachers/{id}/subjects",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    request_body = AssignSubjectDto,
    responses(
        (status = 200, description = "Subject assigned", body = SubjectAssignment),
        (status = 404, description = "Teacher or subject not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn assign_subject(
    State(state): State<AppState>,
    _auth: RequireTeachersAssign,
    Path(teacher_id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<AssignSubjectDto>,
) -> Result<Json<SubjectAssignment>, AppError> {
    let assignment = TeacherService::assign_subject(&state.db, teacher_id, dto.subject_id).await?;

    Ok(Json(assignment))
}

/// Assign a teacher to a class
#[utoipa::path(
    post,
    path = "/api/teachers/{id}/classes",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    request_body = AssignClassDto,
    responses(
        (status = 200, description = "Class assigned", body = ClassAssignment),
        (status = 404, description = "Teacher or class not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn assign_class(
    State(state): State<AppState>,
    _auth: RequireTeachersAssign,
    Path(teacher_id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<AssignClassDto>,
) -> Result<Json<ClassAssignment>, AppError> {
    let assignment = TeacherService::assign_class(&state.db, teacher_id, dto.class_id).await?;

    Ok(Json(assignment))
}

/// Check whether a teacher can teach a subject
#[utoipa::path(
    get,
    path = "/api/teachers/{id}/can-teach/{subject_id}",
    params(
        ("id" = TeacherId, Path, description = "Teacher ID"),
        ("subject_id" = SubjectId, Path, description = "Subject ID")
    ),
    responses(
        (status = 200, description = "Assignment check result", body = CanTeachResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn can_teach_subject(
    State(state): State<AppState>,
    _auth: RequireTeachersRead,
    Path((teacher_id, subject_id)): Path<(TeacherId, SubjectId)>,
) -> Result<Json<CanTeachResponse>, AppError> {
    let can_teach = TeacherService::can_teach_subject(&state.db, teacher_id, subject_id).await?;

    Ok(Json(CanTeachResponse { can_teach }))
}
