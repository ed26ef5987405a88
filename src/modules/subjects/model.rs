use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::ids::SubjectId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
    pub is_mandatory: bool,
    pub credit_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 128, message = "Name must be between 1 and 128 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 16, message = "Code must be between 1 and 16 characters"))]
    pub code: String,
    #[serde(default)]
    pub is_mandatory: bool,
    #[validate(range(min = 1, message = "Credit hours must be at least 1"))]
    pub credit_hours: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 128, message = "Name must be between 1 and 128 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 16, message = "Code must be between 1 and 16 characters"))]
    pub code: Option<String>,
    pub is_mandatory: Option<bool>,
    #[validate(range(min = 1, message = "Credit hours must be at least 1"))]
    pub credit_hours: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubjectFilterParams {
    pub is_mandatory: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}
