use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::{AppError, hash_password};
use rosterly_models::Role;
use rosterly_models::ids::{ClassId, StudentId, UserId};

use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, RecordFeePaymentDto, Student, StudentFilterParams,
    StudentRow, TransferStudentDto, UpdateStudentDto,
};

const STUDENT_SELECT: &str = r#"
    SELECT s.id, s.user_id, u.first_name, u.last_name, u.email,
           s.school_class_id, s.academic_year_id, s.total_fees, s.fees_paid,
           s.medical_notes, s.emergency_contact, s.created_at, s.updated_at
    FROM students s
    JOIN users u ON u.id = s.user_id
"#;

pub struct StudentService;

impl StudentService {
    /// Create a student profile together with its user account in one
    /// transaction. When a class is given, the student inherits that
    /// class's academic year.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (first_name, last_name, email, password, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(Role::Student)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A user with this email already exists"
                ));
            }
            AppError::from(e)
        })?;

        let student_id = sqlx::query_scalar::<_, StudentId>(
            r#"INSERT INTO students
                 (user_id, school_class_id, academic_year_id, total_fees, medical_notes, emergency_contact)
               VALUES
                 ($1, $2,
                  (SELECT academic_year_id FROM school_classes WHERE id = $2),
                  COALESCE($3, 0), $4, $5)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(dto.school_class_id)
        .bind(dto.total_fees)
        .bind(&dto.medical_notes)
        .bind(&dto.emergency_contact)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow::anyhow!("Class not found"));
            }
            AppError::from(e)
        })?;

        tx.commit().await?;

        Self::get_student_by_id(db, student_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(class_id) = filters.school_class_id {
            where_clause.push_str(&format!(" AND s.school_class_id = '{}'", class_id));
        }
        if let Some(year_id) = filters.academic_year_id {
            where_clause.push_str(&format!(" AND s.academic_year_id = '{}'", year_id));
        }

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM students s WHERE TRUE{where_clause}"
        ))
        .fetch_one(db)
        .await?;

        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "{STUDENT_SELECT} WHERE TRUE{where_clause}
             ORDER BY u.last_name, u.first_name LIMIT {limit} OFFSET {offset}"
        ))
        .fetch_all(db)
        .await?;

        Ok(PaginatedStudentsResponse {
            data: rows.into_iter().map(Student::from).collect(),
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, student_id: StudentId) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(student_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        Ok(row.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        student_id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student_by_id(db, student_id).await?;

        let total_fees = dto.total_fees.unwrap_or(existing.total_fees);
        let medical_notes = dto.medical_notes.or(existing.medical_notes);
        let emergency_contact = dto.emergency_contact.or(existing.emergency_contact);

        sqlx::query(
            r#"UPDATE students
               SET total_fees = $1, medical_notes = $2, emergency_contact = $3, updated_at = now()
               WHERE id = $4"#,
        )
        .bind(total_fees)
        .bind(&medical_notes)
        .bind(&emergency_contact)
        .bind(student_id)
        .execute(db)
        .await?;

        Self::get_student_by_id(db, student_id).await
    }

    /// Move a student into a class. The academic year is taken from the
    /// target class in the same statement, so the pair can never disagree.
    #[instrument(skip(db))]
    pub async fn transfer_student(
        db: &PgPool,
        student_id: StudentId,
        dto: TransferStudentDto,
    ) -> Result<Student, AppError> {
        let result = sqlx::query(
            r#"UPDATE students
               SET school_class_id = c.id, academic_year_id = c.academic_year_id,
                   updated_at = now()
               FROM school_classes c
               WHERE students.id = $1 AND c.id = $2"#,
        )
        .bind(student_id)
        .bind(dto.class_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            // Either side may be missing; report the one that is.
            Self::ensure_class_exists(db, dto.class_id).await?;
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Self::get_student_by_id(db, student_id).await
    }

    /// Record a fee payment as a single atomic increment. Concurrent
    /// payments serialize on the row and are all additive.
    #[instrument(skip(db, dto), fields(amount = dto.amount))]
    pub async fn record_fee_payment(
        db: &PgPool,
        student_id: StudentId,
        dto: RecordFeePaymentDto,
    ) -> Result<Student, AppError> {
        let result = sqlx::query(
            "UPDATE students SET fees_paid = fees_paid + $2, updated_at = now() WHERE id = $1",
        )
        .bind(student_id)
        .bind(dto.amount)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Self::get_student_by_id(db, student_id).await
    }

    async fn ensure_class_exists(db: &PgPool, class_id: ClassId) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM school_classes WHERE id = $1)",
        )
        .bind(class_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use rosterly_models::FeeStatus;
    use rosterly_models::ids::AcademicYearId;
    use uuid::Uuid;

    fn student_dto(email: &str, total_fees: i64) -> CreateStudentDto {
        CreateStudentDto {
            first_name: "Sam".to_string(),
            last_name: "Pupil".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            school_class_id: None,
            total_fees: Some(total_fees),
            medical_notes: None,
            emergency_contact: None,
        }
    }

    fn unique_email() -> String {
        format!("student-{}@test.com", Uuid::new_v4())
    }

    async fn seed_year(pool: &PgPool) -> AcademicYearId {
        sqlx::query_scalar::<_, AcademicYearId>(
            "INSERT INTO academic_years (name, start_date, end_date)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(format!("year-{}", Uuid::new_v4()))
        .bind(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
        .bind(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap())
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_class(pool: &PgPool, year_id: AcademicYearId, section: &str) -> ClassId {
        sqlx::query_scalar::<_, ClassId>(
            "INSERT INTO school_classes (grade_level, section, academic_year_id)
             VALUES ('Grade 5', $1, $2) RETURNING id",
        )
        .bind(section)
        .bind(year_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_student_creates_user_with_student_role(pool: PgPool) {
        let student = StudentService::create_student(&pool, student_dto(&unique_email(), 5000))
            .await
            .unwrap();

        let role: Role = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(student.user_id)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(role, Role::Student);
        assert_eq!(student.total_fees, 5000);
        assert_eq!(student.fees_pending, 5000);
        assert_eq!(student.fee_status, FeeStatus::Unpaid);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn student_in_class_inherits_its_academic_year(pool: PgPool) {
        let year_id = seed_year(&pool).await;
        let class_id = seed_class(&pool, year_id, "A").await;

        let mut dto = student_dto(&unique_email(), 0);
        dto.school_class_id = Some(class_id);

        let student = StudentService::create_student(&pool, dto).await.unwrap();

        assert_eq!(student.school_class_id, Some(class_id));
        assert_eq!(student.academic_year_id, Some(year_id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn fee_payments_accumulate(pool: PgPool) {
        let student = StudentService::create_student(&pool, student_dto(&unique_email(), 5000))
            .await
            .unwrap();

        let after_first = StudentService::record_fee_payment(
            &pool,
            student.id,
            RecordFeePaymentDto { amount: 2000 },
        )
        .await
        .unwrap();
        assert_eq!(after_first.fees_paid, 2000);
        assert_eq!(after_first.fees_pending, 3000);
        assert_eq!(after_first.fee_status, FeeStatus::Partial);

        let after_second = StudentService::record_fee_payment(
            &pool,
            student.id,
            RecordFeePaymentDto { amount: 3000 },
        )
        .await
        .unwrap();
        assert_eq!(after_second.fees_paid, 5000);
        assert_eq!(after_second.fees_pending, 0);
        assert_eq!(after_second.fee_status, FeeStatus::Paid);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn overpayment_never_shows_negative_balance(pool: PgPool) {
        let student = StudentService::create_student(&pool, student_dto(&unique_email(), 1000))
            .await
            .unwrap();

        let paid = StudentService::record_fee_payment(
            &pool,
            student.id,
            RecordFeePaymentDto { amount: 1500 },
        )
        .await
        .unwrap();

        assert_eq!(paid.fees_paid, 1500);
        assert_eq!(paid.fees_pending, 0);
        assert_eq!(paid.fee_status, FeeStatus::Paid);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn transfer_keeps_class_and_year_consistent(pool: PgPool) {
        let year_id = seed_year(&pool).await;
        let first_class = seed_class(&pool, year_id, "A").await;
        let other_year = seed_year(&pool).await;
        let second_class = seed_class(&pool, other_year, "B").await;

        let mut dto = student_dto(&unique_email(), 0);
        dto.school_class_id = Some(first_class);
        let student = StudentService::create_student(&pool, dto).await.unwrap();

        let transferred = StudentService::transfer_student(
            &pool,
            student.id,
            TransferStudentDto { class_id: second_class },
        )
        .await
        .unwrap();

        assert_eq!(transferred.school_class_id, Some(second_class));
        assert_eq!(transferred.academic_year_id, Some(other_year));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn transfer_to_missing_class_is_not_found(pool: PgPool) {
        let student = StudentService::create_student(&pool, student_dto(&unique_email(), 0))
            .await
            .unwrap();

        let err = StudentService::transfer_student(
            &pool,
            student.id,
            TransferStudentDto { class_id: ClassId::new() },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn payment_for_missing_student_is_not_found(pool: PgPool) {
        let err = StudentService::record_fee_payment(
            &pool,
            StudentId::new(),
            RecordFeePaymentDto { amount: 100 },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
