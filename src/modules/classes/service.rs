use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::ClassId;

use crate::modules::classes::model::{
    ClassFilterParams, CreateClassDto, PaginatedClassesResponse, SchoolClass, UpdateClassDto,
};

const CLASS_COLUMNS: &str = "id, grade_level, section, capacity, academic_year_id, \
                             class_teacher_id, created_at, updated_at";

pub struct ClassService;

impl ClassService {
    /// Create a class within an academic year. Grade level and section are
    /// unique per year.
    #[instrument(skip(db, dto))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<SchoolClass, AppError> {
        let class = sqlx::query_as::<_, SchoolClass>(&format!(
            r#"INSERT INTO school_classes (grade_level, section, capacity, academic_year_id, class_teacher_id)
               VALUES ($1, $2, COALESCE($3, 30), $4, $5)
               RETURNING {CLASS_COLUMNS}"#
        ))
        .bind(&dto.grade_level)
        .bind(&dto.section)
        .bind(dto.capacity)
        .bind(dto.academic_year_id)
        .bind(dto.class_teacher_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "A class with this grade level and section already exists for this academic year"
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!(
                        "Academic year or teacher not found"
                    ));
                }
            }
            AppError::from(e)
        })?;

        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &PgPool,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(year_id) = filters.academic_year_id {
            where_clause.push_str(&format!(" AND academic_year_id = '{}'", year_id));
        }

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM school_classes WHERE TRUE{where_clause}"
        ))
        .fetch_one(db)
        .await?;

        let classes = sqlx::query_as::<_, SchoolClass>(&format!(
            "SELECT {CLASS_COLUMNS} FROM school_classes WHERE TRUE{where_clause}
             ORDER BY grade_level, section LIMIT {limit} OFFSET {offset}"
        ))
        .fetch_all(db)
        .await?;

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class_by_id(db: &PgPool, class_id: ClassId) -> Result<SchoolClass, AppError> {
        let class = sqlx::query_as::<_, SchoolClass>(&format!(
            "SELECT {CLASS_COLUMNS} FROM school_classes WHERE id = $1"
        ))
        .bind(class_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))?;

        Ok(class)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_class(
        db: &PgPool,
        class_id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<SchoolClass, AppError> {
        let existing = Self::get_class_by_id(db, class_id).await?;

        let grade_level = dto.grade_level.unwrap_or(existing.grade_level);
        let section = dto.section.unwrap_or(existing.section);
        let capacity = dto.capacity.unwrap_or(existing.capacity);
        let class_teacher_id = dto.class_teacher_id.or(existing.class_teacher_id);

        let class = sqlx::query_as::<_, SchoolClass>(&format!(
            r#"UPDATE school_classes
               SET grade_level = $1, section = $2, capacity = $3, class_teacher_id = $4,
                   updated_at = now()
               WHERE id = $5
               RETURNING {CLASS_COLUMNS}"#
        ))
        .bind(&grade_level)
        .bind(&section)
        .bind(capacity)
        .bind(class_teacher_id)
        .bind(class_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "A class with this grade level and section already exists for this academic year"
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("Teacher not found"));
                }
            }
            AppError::from(e)
        })?;

        Ok(class)
    }

    /// Delete a class. Classes with students assigned are protected by a
    /// RESTRICT foreign key and report a conflict instead.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, class_id: ClassId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM school_classes WHERE id = $1")
            .bind(class_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow::anyhow!(
                        "Class has students assigned and cannot be deleted"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }

        Ok(())
    }
}
