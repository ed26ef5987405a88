use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::EnrollmentStatus;
use rosterly_models::ids::{AcademicYearId, EnrollmentId, StudentId, SubjectId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub academic_year_id: AcademicYearId,
    pub status: EnrollmentStatus,
    pub grade: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnrollStudentDto {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteEnrollmentDto {
    /// Final grade on a 0-100 scale; optional for pass/fail subjects.
    #[validate(range(min = 0.0, max = 100.0, message = "Grade must be between 0 and 100"))]
    pub grade: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollmentFilterParams {
    pub student_id: Option<StudentId>,
    pub subject_id: Option<SubjectId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedEnrollmentsResponse {
    pub data: Vec<Enrollment>,
    pub meta: PaginationMeta,
}
