use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::SubjectId;

use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};

const SUBJECT_COLUMNS: &str = "id, name, code, is_mandatory, credit_hours, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            r#"INSERT INTO subjects (name, code, is_mandatory, credit_hours)
               VALUES ($1, $2, $3, COALESCE($4, 1))
               RETURNING {SUBJECT_COLUMNS}"#
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.is_mandatory)
        .bind(dto.credit_hours)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A subject with this code already exists"
                ));
            }
            AppError::from(e)
        })?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        filters: SubjectFilterParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(is_mandatory) = filters.is_mandatory {
            where_clause.push_str(&format!(" AND is_mandatory = {}", is_mandatory));
        }

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM subjects WHERE TRUE{where_clause}"
        ))
        .fetch_one(db)
        .await?;

        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE TRUE{where_clause}
             ORDER BY code LIMIT {limit} OFFSET {offset}"
        ))
        .fetch_all(db)
        .await?;

        Ok(PaginatedSubjectsResponse {
            data: subjects,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject_by_id(db: &PgPool, subject_id: SubjectId) -> Result<Subject, AppError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(subject_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))?;

        Ok(subject)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &PgPool,
        subject_id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let existing = Self::get_subject_by_id(db, subject_id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let code = dto.code.unwrap_or(existing.code);
        let is_mandatory = dto.is_mandatory.unwrap_or(existing.is_mandatory);
        let credit_hours = dto.credit_hours.unwrap_or(existing.credit_hours);

        let subject = sqlx::query_as::<_, Subject>(&format!(
            r#"UPDATE subjects
               SET name = $1, code = $2, is_mandatory = $3, credit_hours = $4, updated_at = now()
               WHERE id = $5
               RETURNING {SUBJECT_COLUMNS}"#
        ))
        .bind(&name)
        .bind(&code)
        .bind(is_mandatory)
        .bind(credit_hours)
        .bind(subject_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A subject with this code already exists"
                ));
            }
            AppError::from(e)
        })?;

        Ok(subject)
    }

    /// Delete a subject. Subjects referenced by enrollments or teacher
    /// assignments cannot be removed.
    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, subject_id: SubjectId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(subject_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow::anyhow!(
                        "Subject is still referenced by enrollments or assignments"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        Ok(())
    }
}
