use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use rosterly_core::{PaginationMeta, PaginationParams};
use rosterly_models::FeeStatus;
use rosterly_models::ids::{AcademicYearId, ClassId, StudentId, UserId};

/// Raw student row joined with the owning user account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRow {
    pub id: StudentId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub school_class_id: Option<ClassId>,
    pub academic_year_id: Option<AcademicYearId>,
    pub total_fees: i64,
    pub fees_paid: i64,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student as exposed by the API. Fee balance and status are derived at
/// read time from the stored amounts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub school_class_id: Option<ClassId>,
    pub academic_year_id: Option<AcademicYearId>,
    pub total_fees: i64,
    pub fees_paid: i64,
    pub fees_pending: i64,
    pub fee_status: FeeStatus,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        // Overpayment never shows a negative balance.
        let fees_pending = (row.total_fees - row.fees_paid).max(0);
        let fee_status = FeeStatus::derive(row.total_fees, row.fees_paid);

        Student {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            school_class_id: row.school_class_id,
            academic_year_id: row.academic_year_id,
            total_fees: row.total_fees,
            fees_paid: row.fees_paid,
            fees_pending,
            fee_status,
            medical_notes: row.medical_notes,
            emergency_contact: row.emergency_contact,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 64, message = "First name must be between 1 and 64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be between 1 and 64 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub school_class_id: Option<ClassId>,
    #[validate(range(min = 0, message = "Total fees cannot be negative"))]
    pub total_fees: Option<i64>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(range(min = 0, message = "Total fees cannot be negative"))]
    pub total_fees: Option<i64>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferStudentDto {
    pub class_id: ClassId,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordFeePaymentDto {
    /// Payment amount in minor currency units.
    #[validate(range(min = 1, message = "Payment amount must be at least 1"))]
    pub amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StudentFilterParams {
    pub school_class_id: Option<ClassId>,
    pub academic_year_id: Option<AcademicYearId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}
