use serde::Serialize;
use utoipa::ToSchema;

use rosterly_models::FeeStatus;

use crate::modules::academic_years::model::AcademicYear;

/// Role-dependent dashboard payload. Each user gets exactly the variant
/// their role entitles them to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "dashboard", rename_all = "snake_case")]
pub enum DashboardSummary {
    Admin(AdminDashboard),
    Teacher(TeacherDashboard),
    Student(StudentDashboard),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_classes: i64,
    pub total_subjects: i64,
    pub active_enrollments: i64,
    pub current_academic_year: Option<AcademicYear>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherDashboard {
    pub assigned_subjects: i64,
    pub assigned_classes: i64,
    pub total_students_taught: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDashboard {
    pub active_enrollments: i64,
    pub completed_enrollments: i64,
    pub total_fees: i64,
    pub fees_paid: i64,
    pub fees_pending: i64,
    pub fee_status: FeeStatus,
}
