use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::{AppError, hash_password};
use rosterly_models::Role;
use rosterly_models::ids::{ClassId, SubjectId, TeacherId};

use crate::modules::teachers::model::{
    ClassAssignment, CreateTeacherDto, PaginatedTeachersResponse, SubjectAssignment, Teacher,
    TeacherFilterParams, UpdateTeacherDto,
};

const TEACHER_SELECT: &str = r#"
    SELECT t.id, t.user_id, u.first_name, u.last_name, u.email,
           t.department, t.salary, t.created_at, t.updated_at
    FROM teachers t
    JOIN users u ON u.id = t.user_id
"#;

pub struct TeacherService;

impl TeacherService {
    /// Create a teacher profile together with its user account. Both rows
    /// are written in one transaction so a profile never exists without a
    /// teacher-role user behind it.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, rosterly_models::ids::UserId>(
            r#"INSERT INTO users (first_name, last_name, email, password, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(Role::Teacher)
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

        let teacher_id = sqlx::query_scalar::<_, TeacherId>(
            r#"INSERT INTO teachers (user_id, department, salary)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(&dto.department)
        .bind(dto.salary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Self::get_teacher_by_id(db, teacher_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        filters: TeacherFilterParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        // Department is free text, so it is always passed as a bind.
        let (total, teachers) = if let Some(department) = &filters.department {
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM teachers WHERE department = $1",
            )
            .bind(department)
            .fetch_one(db)
            .await?;

            let teachers = sqlx::query_as::<_, Teacher>(&format!(
                "{TEACHER_SELECT} WHERE t.department = $1
                 ORDER BY u.last_name, u.first_name LIMIT {limit} OFFSET {offset}"
            ))
            .bind(department)
            .fetch_all(db)
            .await?;

            (total, teachers)
        } else {
            let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers")
                .fetch_one(db)
                .await?;

            let teachers = sqlx::query_as::<_, Teacher>(&format!(
                "{TEACHER_SELECT} ORDER BY u.last_name, u.first_name LIMIT {limit} OFFSET {offset}"
            ))
            .fetch_all(db)
            .await?;

            (total, teachers)
        };

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, teacher_id: TeacherId) -> Result<Teacher, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>(&format!("{TEACHER_SELECT} WHERE t.id = $1"))
            .bind(teacher_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Teacher not found")))?;

        Ok(teacher)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        teacher_id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::get_teacher_by_id(db, teacher_id).await?;

        let department = dto.department.unwrap_or(existing.department);
        let salary = dto.salary.or(existing.salary);

        sqlx::query(
            "UPDATE teachers SET department = $1, salary = $2, updated_at = now() WHERE id = $3",
        )
        .bind(&department)
        .bind(salary)
        .bind(teacher_id)
        .execute(db)
        .await?;

        Self::get_teacher_by_id(db, teacher_id).await
    }

    /// Assign a subject to a teacher. Re-assigning reactivates a previously
    /// deactivated assignment rather than failing.
    #[instrument(skip(db))]
    pub async fn assign_subject(
        db: &PgPool,
        teacher_id: TeacherId,
        subject_id: SubjectId,
    ) -> Result<SubjectAssignment, AppError> {
        let assignment = sqlx::query_as::<_, SubjectAssignment>(
            r#"INSERT INTO teacher_subjects (teacher_id, subject_id)
               VALUES ($1, $2)
               ON CONFLICT (teacher_id, subject_id)
               DO UPDATE SET status = 'active', updated_at = now()
               RETURNING teacher_id, subject_id, status"#,
        )
        .bind(teacher_id)
        .bind(subject_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow::anyhow!("Teacher or subject not found"));
            }
            AppError::from(e)
        })?;

        Ok(assignment)
    }

    /// Assign a teacher to a class, same upsert semantics as
    /// [`Self::assign_subject`].
    #[instrument(skip(db))]
    pub async fn assign_class(
        db: &PgPool,
        teacher_id: TeacherId,
        class_id: ClassId,
    ) -> Result<ClassAssignment, AppError> {
        let assignment = sqlx::query_as::<_, ClassAssignment>(
            r#"INSERT INTO teacher_classes (teacher_id, school_class_id)
               VALUES ($1, $2)
               ON CONFLICT (teacher_id, school_class_id)
               DO UPDATE SET status = 'active', updated_at = now()
               RETURNING teacher_id, school_class_id, status"#,
        )
        .bind(teacher_id)
        .bind(class_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow::anyhow!("Teacher or class not found"));
            }
            AppError::from(e)
        })?;

        Ok(assignment)
    }

    /// A teacher can teach a subject iff an active assignment row exists.
    /// Department and qualifications play no part in the check.
    #[instrument(skip(db))]
    pub async fn can_teach_subject(
        db: &PgPool,
        teacher_id: TeacherId,
        subject_id: SubjectId,
    ) -> Result<bool, AppError> {
        let can_teach = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                 SELECT 1 FROM teacher_subjects
                 WHERE teacher_id = $1 AND subject_id = $2 AND status = 'active'
               )"#,
        )
        .bind(teacher_id)
        .bind(subject_id)
        .fetch_one(db)
        .await?;

        Ok(can_teach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rosterly_models::AssignmentStatus;
    use uuid::Uuid;

    fn teacher_dto(email: &str) -> CreateTeacherDto {
        CreateTeacherDto {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            department: "Science".to_string(),
            salary: Some(55_000_00),
        }
    }

    fn unique_email() -> String {
        format!("teacher-{}@test.com", Uuid::new_v4())
    }

    async fn seed_subject(pool: &PgPool) -> SubjectId {
        sqlx::query_scalar::<_, SubjectId>(
            "INSERT INTO subjects (name, code) VALUES ($1, $2) RETURNING id",
        )
        .bind("Mathematics")
        .bind(format!("MATH-{}", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_teacher_creates_user_with_teacher_role(pool: PgPool) {
        let teacher = TeacherService::create_teacher(&pool, teacher_dto(&unique_email()))
            .await
            .unwrap();

        let role: Role = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(teacher.user_id)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(role, Role::Teacher);
        assert_eq!(teacher.department, "Science");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_email_rolls_back_whole_creation(pool: PgPool) {
        let email = unique_email();
        TeacherService::create_teacher(&pool, teacher_dto(&email))
            .await
            .unwrap();

        let err = TeacherService::create_teacher(&pool, teacher_dto(&email))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let teacher_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(teacher_count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn assignment_gates_can_teach(pool: PgPool) {
        let teacher = TeacherService::create_teacher(&pool, teacher_dto(&unique_email()))
            .await
            .unwrap();
        let subject_id = seed_subject(&pool).await;

        assert!(
            !TeacherService::can_teach_subject(&pool, teacher.id, subject_id)
                .await
                .unwrap()
        );

        let assignment = TeacherService::assign_subject(&pool, teacher.id, subject_id)
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Active);

        assert!(
            TeacherService::can_teach_subject(&pool, teacher.id, subject_id)
                .await
                .unwrap()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn assign_subject_is_idempotent(pool: PgPool) {
        let teacher = TeacherService::create_teacher(&pool, teacher_dto(&unique_email()))
            .await
            .unwrap();
        let subject_id = seed_subject(&pool).await;

        TeacherService::assign_subject(&pool, teacher.id, subject_id)
            .await
            .unwrap();
        TeacherService::assign_subject(&pool, teacher.id, subject_id)
            .await
            .unwrap();

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM teacher_subjects WHERE teacher_id = $1 AND subject_id = $2",
        )
        .bind(teacher.id)
        .bind(subject_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn reassignment_reactivates_inactive_assignment(pool: PgPool) {
        let teacher = TeacherService::create_teacher(&pool, teacher_dto(&unique_email()))
            .await
            .unwrap();
        let subject_id = seed_subject(&pool).await;

        TeacherService::assign_subject(&pool, teacher.id, subject_id)
            .await
            .unwrap();

        sqlx::query(
            "UPDATE teacher_subjects SET status = 'inactive' WHERE teacher_id = $1 AND subject_id = $2",
        )
        .bind(teacher.id)
        .bind(subject_id)
        .execute(&pool)
        .await
        .unwrap();

        assert!(
            !TeacherService::can_teach_subject(&pool, teacher.id, subject_id)
                .await
                .unwrap()
        );

        TeacherService::assign_subject(&pool, teacher.id, subject_id)
            .await
            .unwrap();

        assert!(
            TeacherService::can_teach_subject(&pool, teacher.id, subject_id)
                .await
                .unwrap()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn assign_to_missing_subject_is_not_found(pool: PgPool) {
        let teacher = TeacherService::create_teacher(&pool, teacher_dto(&unique_email()))
            .await
            .unwrap();

        let err = TeacherService::assign_subject(&pool, teacher.id, SubjectId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
