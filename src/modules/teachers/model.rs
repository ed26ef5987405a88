use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::AssignmentStatus;
use rosterly_models::ids::{ClassId, SubjectId, TeacherId, UserId};

/// Teacher profile joined with the owning user account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub salary: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 64, message = "First name must be between 1 and 64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be between 1 and 64 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 64, message = "Department must be between 1 and 64 characters"))]
    pub department: String,
    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 64, message = "Department must be between 1 and 64 characters"))]
    pub department: Option<String>,
    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignSubjectDto {
    pub subject_id: SubjectId,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignClassDto {
    pub class_id: ClassId,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct SubjectAssignment {
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ClassAssignment {
    pub teacher_id: TeacherId,
    pub school_class_id: ClassId,
    pub status: AssignmentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CanTeachResponse {
    pub can_teach: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TeacherFilterParams {
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<Teacher>,
    pub meta: PaginationMeta,
}
