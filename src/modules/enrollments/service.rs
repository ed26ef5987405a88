use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::{AcademicYearId, EnrollmentId, StudentId, SubjectId};

use crate::modules::enrollments::model::{
    CompleteEnrollmentDto, EnrollStudentDto, Enrollment, EnrollmentFilterParams,
    PaginatedEnrollmentsResponse,
};

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, subject_id, academic_year_id, status, grade, created_at, updated_at";

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enroll a student in a subject for the student's academic year.
    ///
    /// Idempotent: a second enroll for the same pair returns the existing
    /// row unchanged, whatever its status. A dropped enrollment is never
    /// silently resurrected. Returns `true` when a new row was created.
    #[instrument(skip(db))]
    pub async fn enroll(
        db: &PgPool,
        dto: EnrollStudentDto,
    ) -> Result<(Enrollment, bool), AppError> {
        let academic_year_id = sqlx::query_scalar::<_, Option<AcademicYearId>>(
            "SELECT academic_year_id FROM students WHERE id = $1",
        )
        .bind(dto.student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?
        .ok_or_else(|| {
            AppError::unprocessable(anyhow::anyhow!(
                "Student is not attached to an academic year"
            ))
        })?;

        let subject_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)",
        )
        .bind(dto.subject_id)
        .fetch_one(db)
        .await?;
        if !subject_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        // Concurrent enrolls race here; the unique key collapses them and
        // the loser falls through to the existing-row read.
        let inserted = sqlx::query_as::<_, Enrollment>(&format!(
            r#"INSERT INTO enrollments (student_id, subject_id, academic_year_id)
               VALUES ($1, $2, $3)
               ON CONFLICT (student_id, subject_id, academic_year_id) DO NOTHING
               RETURNING {ENROLLMENT_COLUMNS}"#
        ))
        .bind(dto.student_id)
        .bind(dto.subject_id)
        .bind(academic_year_id)
        .fetch_optional(db)
        .await?;

        if let Some(enrollment) = inserted {
            return Ok((enrollment, true));
        }

        let existing = sqlx::query_as::<_, Enrollment>(&format!(
            r#"SELECT {ENROLLMENT_COLUMNS} FROM enrollments
               WHERE student_id = $1 AND subject_id = $2 AND academic_year_id = $3"#
        ))
        .bind(dto.student_id)
        .bind(dto.subject_id)
        .bind(academic_year_id)
        .fetch_one(db)
        .await?;

        Ok((existing, false))
    }

    #[instrument(skip(db))]
    pub async fn get_enrollments(
        db: &PgPool,
        filters: EnrollmentFilterParams,
    ) -> Result<PaginatedEnrollmentsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(student_id) = filters.student_id {
            where_clause.push_str(&format!(" AND student_id = '{}'", student_id));
        }
        if let Some(subject_id) = filters.subject_id {
            where_clause.push_str(&format!(" AND subject_id = '{}'", subject_id));
        }

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM enrollments WHERE TRUE{where_clause}"
        ))
        .fetch_one(db)
        .await?;

        let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE TRUE{where_clause}
             ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
        ))
        .fetch_all(db)
        .await?;

        Ok(PaginatedEnrollmentsResponse {
            data: enrollments,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment_by_id(
        db: &PgPool,
        enrollment_id: EnrollmentId,
    ) -> Result<Enrollment, AppError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(enrollment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment not found")))?;

        Ok(enrollment)
    }

    /// All enrollments for one student, newest first.
    #[instrument(skip(db))]
    pub async fn get_student_enrollments(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, AppError> {
        let student_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)",
        )
        .bind(student_id)
        .fetch_one(db)
        .await?;
        if !student_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(enrollments)
    }

    /// Mark an active enrollment completed, optionally recording a grade.
    /// Only `enrolled` rows transition; completed and dropped are terminal.
    #[instrument(skip(db, dto))]
    pub async fn complete(
        db: &PgPool,
        enrollment_id: EnrollmentId,
        dto: CompleteEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let updated = sqlx::query_as::<_, Enrollment>(&format!(
            r#"UPDATE enrollments
               SET status = 'completed', grade = $2, updated_at = now()
               WHERE id = $1 AND status = 'enrolled'
               RETURNING {ENROLLMENT_COLUMNS}"#
        ))
        .bind(enrollment_id)
        .bind(dto.grade)
        .fetch_optional(db)
        .await?;

        match updated {
            Some(enrollment) => Ok(enrollment),
            None => Err(Self::transition_error(db, enrollment_id).await?),
        }
    }

    /// Drop an active enrollment. Terminal like `complete`.
    #[instrument(skip(db))]
    pub async fn drop(db: &PgPool, enrollment_id: EnrollmentId) -> Result<Enrollment, AppError> {
        let updated = sqlx::query_as::<_, Enrollment>(&format!(
            r#"UPDATE enrollments
               SET status = 'dropped', updated_at = now()
               WHERE id = $1 AND status = 'enrolled'
               RETURNING {ENROLLMENT_COLUMNS}"#
        ))
        .bind(enrollment_id)
        .fetch_optional(db)
        .await?;

        match updated {
            Some(enrollment) => Ok(enrollment),
            None => Err(Self::transition_error(db, enrollment_id).await?),
        }
    }

    /// A failed transition is either a missing row or a terminal status.
    async fn transition_error(
        db: &PgPool,
        enrollment_id: EnrollmentId,
    ) -> Result<AppError, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE id = $1)",
        )
        .bind(enrollment_id)
        .fetch_one(db)
        .await?;

        if exists {
            Ok(AppError::conflict(anyhow::anyhow!(
                "Enrollment is no longer active"
            )))
        } else {
            Ok(AppError::not_found(anyhow::anyhow!("Enrollment not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use rosterly_models::EnrollmentStatus;
    use rosterly_models::ids::{AcademicYearId, ClassId};
    use uuid::Uuid;

    struct Fixture {
        student_id: StudentId,
        subject_id: SubjectId,
    }

    async fn seed(pool: &PgPool) -> Fixture {
        let year_id = sqlx::query_scalar::<_, AcademicYearId>(
            "INSERT INTO academic_years (name, start_date, end_date)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(format!("year-{}", Uuid::new_v4()))
        .bind(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
        .bind(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap())
        .fetch_one(pool)
        .await
        .unwrap();

        let class_id = sqlx::query_scalar::<_, ClassId>(
            "INSERT INTO school_classes (grade_level, section, academic_year_id)
             VALUES ('Grade 5', 'A', $1) RETURNING id",
        )
        .bind(year_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ('Sam', 'Pupil', $1, 'x', 'student') RETURNING id",
        )
        .bind(format!("s-{}@test.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap();

        let student_id = sqlx::query_scalar::<_, StudentId>(
            "INSERT INTO students (user_id, school_class_id, academic_year_id)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(class_id)
        .bind(year_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let subject_id = sqlx::query_scalar::<_, SubjectId>(
            "INSERT INTO subjects (name, code) VALUES ('Mathematics', $1) RETURNING id",
        )
        .bind(format!("MATH-{}", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap();

        Fixture { student_id, subject_id }
    }

    fn enroll_dto(fx: &Fixture) -> EnrollStudentDto {
        EnrollStudentDto {
            student_id: fx.student_id,
            subject_id: fx.subject_id,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn enroll_creates_active_enrollment(pool: PgPool) {
        let fx = seed(&pool).await;

        let (enrollment, created) = EnrollmentService::enroll(&pool, enroll_dto(&fx))
            .await
            .unwrap();

        assert!(created);
        assert_eq!(enrollment.status, EnrollmentStatus::Enrolled);
        assert!(enrollment.grade.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn student_enrollments_lists_all_statuses(pool: PgPool) {
        let fx = seed(&pool).await;

        let second_subject = sqlx::query_scalar::<_, SubjectId>(
            "INSERT INTO subjects (name, code) VALUES ('History', $1) RETURNING id",
        )
        .bind(format!("HIST-{}", Uuid::new_v4()))
        .fetch_one(&pool)
        .await
        .unwrap();

        let (first, _) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();
        EnrollmentService::drop(&pool, first.id).await.unwrap();
        EnrollmentService::enroll(
            &pool,
            EnrollStudentDto {
                student_id: fx.student_id,
                subject_id: second_subject,
            },
        )
        .await
        .unwrap();

        let enrollments = EnrollmentService::get_student_enrollments(&pool, fx.student_id)
            .await
            .unwrap();
        assert_eq!(enrollments.len(), 2);

        let err = EnrollmentService::get_student_enrollments(&pool, StudentId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn enroll_is_idempotent(pool: PgPool) {
        let fx = seed(&pool).await;

        let (first, created) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();
        assert!(created);

        let (second, created) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn enroll_does_not_resurrect_dropped_enrollment(pool: PgPool) {
        let fx = seed(&pool).await;

        let (enrollment, _) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();
        EnrollmentService::drop(&pool, enrollment.id).await.unwrap();

        let (after, created) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();
        assert!(!created);
        assert_eq!(after.id, enrollment.id);
        assert_eq!(after.status, EnrollmentStatus::Dropped);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn complete_records_grade(pool: PgPool) {
        let fx = seed(&pool).await;
        let (enrollment, _) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();

        let completed = EnrollmentService::complete(
            &pool,
            enrollment.id,
            CompleteEnrollmentDto { grade: Some(87.5) },
        )
        .await
        .unwrap();

        assert_eq!(completed.status, EnrollmentStatus::Completed);
        assert_eq!(completed.grade, Some(87.5));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn terminal_states_reject_further_transitions(pool: PgPool) {
        let fx = seed(&pool).await;
        let (enrollment, _) = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap();

        EnrollmentService::complete(&pool, enrollment.id, CompleteEnrollmentDto { grade: None })
            .await
            .unwrap();

        let err = EnrollmentService::drop(&pool, enrollment.id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = EnrollmentService::complete(
            &pool,
            enrollment.id,
            CompleteEnrollmentDto { grade: Some(50.0) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn enroll_requires_student_academic_year(pool: PgPool) {
        let fx = seed(&pool).await;

        sqlx::query("UPDATE students SET academic_year_id = NULL, school_class_id = NULL WHERE id = $1")
            .bind(fx.student_id)
            .execute(&pool)
            .await
            .unwrap();

        let err = EnrollmentService::enroll(&pool, enroll_dto(&fx)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn enroll_in_missing_subject_is_not_found(pool: PgPool) {
        let fx = seed(&pool).await;

        let err = EnrollmentService::enroll(
            &pool,
            EnrollStudentDto {
                student_id: fx.student_id,
                subject_id: SubjectId::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
