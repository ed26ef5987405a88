use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::{StudentId, TeacherId, UserId};
use rosterly_models::{FeeStatus, Role};

use crate::modules::academic_years::model::AcademicYear;
use crate::modules::dashboard::model::{
    AdminDashboard, DashboardSummary, StudentDashboard, TeacherDashboard,
};

pub struct DashboardService;

impl DashboardService {
    /// Build the dashboard for the authenticated user based on their role.
    #[instrument(skip(db))]
    pub async fn summary(
        db: &PgPool,
        user_id: UserId,
        role: Role,
    ) -> Result<DashboardSummary, AppError> {
        match role {
            Role::SuperAdmin | Role::Admin => Self::admin_summary(db).await,
            Role::Teacher => Self::teacher_summary(db, user_id).await,
            Role::Student => Self::student_summary(db, user_id).await,
        }
    }

    async fn admin_summary(db: &PgPool) -> Result<DashboardSummary, AppError> {
        let (total_students, total_teachers, total_classes, total_subjects, active_enrollments) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"SELECT
                     (SELECT COUNT(*) FROM students),
                     (SELECT COUNT(*) FROM teachers),
                     (SELECT COUNT(*) FROM school_classes),
                     (SELECT COUNT(*) FROM subjects),
                     (SELECT COUNT(*) FROM enrollments WHERE status = 'enrolled')"#,
            )
            .fetch_one(db)
            .await?;

        let current_academic_year = sqlx::query_as::<_, AcademicYear>(
            "SELECT id, name, start_date, end_date, is_current, created_at, updated_at
             FROM academic_years WHERE is_current",
        )
        .fetch_optional(db)
        .await?;

        Ok(DashboardSummary::Admin(AdminDashboard {
            total_students,
            total_teachers,
            total_classes,
            total_subjects,
            active_enrollments,
            current_academic_year,
        }))
    }

    async fn teacher_summary(db: &PgPool, user_id: UserId) -> Result<DashboardSummary, AppError> {
        let teacher_id = sqlx::query_scalar::<_, TeacherId>(
            "SELECT id FROM teachers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Teacher profile not found")))?;

        let (assigned_subjects, assigned_classes, total_students_taught) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"SELECT
                     (SELECT COUNT(*) FROM teacher_subjects
                      WHERE teacher_id = $1 AND status = 'active'),
                     (SELECT COUNT(*) FROM teacher_classes
                      WHERE teacher_id = $1 AND status = 'active'),
                     (SELECT COUNT(*) FROM students s
                      WHERE s.school_class_id IN (
                        SELECT school_class_id FROM teacher_classes
                        WHERE teacher_id = $1 AND status = 'active'
                      ))"#,
            )
            .bind(teacher_id)
            .fetch_one(db)
            .await?;

        Ok(DashboardSummary::Teacher(TeacherDashboard {
            assigned_subjects,
            assigned_classes,
            total_students_taught,
        }))
    }

    async fn student_summary(db: &PgPool, user_id: UserId) -> Result<DashboardSummary, AppError> {
        let (student_id, total_fees, fees_paid) =
            sqlx::query_as::<_, (StudentId, i64, i64)>(
                "SELECT id, total_fees, fees_paid FROM students WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student profile not found")))?;

        let (active_enrollments, completed_enrollments) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT
                 (SELECT COUNT(*) FROM enrollments
                  WHERE student_id = $1 AND status = 'enrolled'),
                 (SELECT COUNT(*) FROM enrollments
                  WHERE student_id = $1 AND status = 'completed')"#,
        )
        .bind(student_id)
        .fetch_one(db)
        .await?;

        Ok(DashboardSummary::Student(StudentDashboard {
            active_enrollments,
            completed_enrollments,
            total_fees,
            fees_paid,
            fees_pending: (total_fees - fees_paid).max(0),
            fee_status: FeeStatus::derive(total_fees, fees_paid),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn seed_user(pool: &PgPool, role: &str) -> UserId {
        sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ('D', 'Board', $1, 'x', $2::user_role) RETURNING id",
        )
        .bind(format!("dash-{}@test.com", Uuid::new_v4()))
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn admin_summary_counts_entities(pool: PgPool) {
        let admin_id = seed_user(&pool, "admin").await;

        let student_user = seed_user(&pool, "student").await;
        sqlx::query("INSERT INTO students (user_id) VALUES ($1)")
            .bind(student_user)
            .execute(&pool)
            .await
            .unwrap();

        let summary = DashboardService::summary(&pool, admin_id, Role::Admin)
            .await
            .unwrap();

        match summary {
            DashboardSummary::Admin(admin) => {
                assert_eq!(admin.total_students, 1);
                assert_eq!(admin.total_teachers, 0);
                assert!(admin.current_academic_year.is_none());
            }
            other => panic!("expected admin dashboard, got {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn student_summary_derives_fee_state(pool: PgPool) {
        let user_id = seed_user(&pool, "student").await;
        sqlx::query(
            "INSERT INTO students (user_id, total_fees, fees_paid) VALUES ($1, 5000, 2000)",
        )
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

        let summary = DashboardService::summary(&pool, user_id, Role::Student)
            .await
            .unwrap();

        match summary {
            DashboardSummary::Student(student) => {
                assert_eq!(student.fees_pending, 3000);
                assert_eq!(student.fee_status, FeeStatus::Partial);
            }
            other => panic!("expected student dashboard, got {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn teacher_without_profile_is_not_found(pool: PgPool) {
        let user_id = seed_user(&pool, "teacher").await;

        let err = DashboardService::summary(&pool, user_id, Role::Teacher)
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }
}
