use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::StudentId;

use crate::middleware::auth::{
    RequireStudentsCreate, RequireStudentsRead, RequireStudentsTransfer, RequireStudentsUpdate,
    RequireStudentsUpdateFees,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, RecordFeePaymentDto, Student, StudentFilterParams,
    TransferStudentDto, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a student with their user account
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation failure", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    _auth: RequireStudentsCreate,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// List students
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Paginated students", body = PaginatedStudentsResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    _auth: RequireStudentsRead,
    Query(filters): Query<StudentFilterParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let response = StudentService::get_students(&state.db, filters).await?;

    Ok(Json(response))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    _auth: RequireStudentsRead,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student_by_id(&state.db, student_id).await?;

    Ok(Json(student))
}

/// Update a student's profile
#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    _auth: RequireStudentsUpdate,
    Path(student_id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(&state.db, student_id, dto).await?;

    Ok(Json(student))
}

/// Transfer a student to another class
#[utoipa::path(
    post,
    path = "/api/students/{id}/transfer",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = TransferStudentDto,
    responses(
        (status = 200, description = "Student transferred", body = Student),
        (status = 404, description = "Student or class not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn transfer_student(
    State(state): State<AppState>,
    _auth: RequireStudentsTransfer,
    Path(student_id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<TransferStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::transfer_student(&state.db, student_id, dto).await?;

    Ok(Json(student))
}

/// Record a fee payment
#[utoipa::path(
    post,
    path = "/api/students/{id}/fees",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = RecordFeePaymentDto,
    responses(
        (status = 200, description = "Payment recorded", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 422, description = "Invalid amount", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn record_fee_payment(
    State(state): State<AppState>,
    _auth: RequireStudentsUpdateFees,
    Path(student_id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<RecordFeePaymentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::record_fee_payment(&state.db, student_id, dto).await?;

    Ok(Json(student))
}
