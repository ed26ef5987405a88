use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::ids::{AcademicYearId, ClassId, TeacherId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SchoolClass {
    pub id: ClassId,
    pub grade_level: String,
    pub section: String,
    pub capacity: i32,
    pub academic_year_id: AcademicYearId,
    pub class_teacher_id: Option<TeacherId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 32, message = "Grade level must be between 1 and 32 characters"))]
    pub grade_level: String,
    #[validate(length(min = 1, max = 16, message = "Section must be between 1 and 16 characters"))]
    pub section: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub academic_year_id: AcademicYearId,
    pub class_teacher_id: Option<TeacherId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 32, message = "Grade level must be between 1 and 32 characters"))]
    pub grade_level: Option<String>,
    #[validate(length(min = 1, max = 16, message = "Section must be between 1 and 16 characters"))]
    pub section: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub class_teacher_id: Option<TeacherId>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassFilterParams {
    pub academic_year_id: Option<AcademicYearId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<SchoolClass>,
    pub meta: PaginationMeta,
}
