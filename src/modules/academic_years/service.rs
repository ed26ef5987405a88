use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;
use rosterly_models::ids::AcademicYearId;

use crate::modules::academic_years::model::{
    AcademicYear, AcademicYearFilterParams, CreateAcademicYearDto, PaginatedAcademicYearsResponse,
    UpdateAcademicYearDto,
};

const YEAR_COLUMNS: &str = "id, name, start_date, end_date, is_current, created_at, updated_at";

pub struct AcademicYearService;

impl AcademicYearService {
    /// Create an academic year. New years are never current; use
    /// [`Self::set_current`] to promote one.
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_academic_year(
        db: &PgPool,
        dto: CreateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        if dto.start_date >= dto.end_date {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Start date must be before end date"
            )));
        }

        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            r#"INSERT INTO academic_years (name, start_date, end_date)
               VALUES ($1, $2, $3)
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(&dto.name)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "An academic year with this name already exists"
                ));
            }
            AppError::from(e)
        })?;

        Ok(year)
    }

    #[instrument(skip(db))]
    pub async fn get_academic_years(
        db: &PgPool,
        filters: AcademicYearFilterParams,
    ) -> Result<PaginatedAcademicYearsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(is_current) = filters.is_current {
            where_clause.push_str(&format!(" AND is_current = {}", is_current));
        }

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM academic_years WHERE TRUE{where_clause}"
        ))
        .fetch_one(db)
        .await?;

        let years = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years WHERE TRUE{where_clause}
             ORDER BY start_date DESC LIMIT {limit} OFFSET {offset}"
        ))
        .fetch_all(db)
        .await?;

        Ok(PaginatedAcademicYearsResponse {
            data: years,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_academic_year_by_id(
        db: &PgPool,
        year_id: AcademicYearId,
    ) -> Result<AcademicYear, AppError> {
        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years WHERE id = $1"
        ))
        .bind(year_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic year not found")))?;

        Ok(year)
    }

    /// Get the current academic year, if one has been set.
    #[instrument(skip(db))]
    pub async fn get_current_academic_year(db: &PgPool) -> Result<AcademicYear, AppError> {
        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years WHERE is_current"
        ))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No current academic year is set")))?;

        Ok(year)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_academic_year(
        db: &PgPool,
        year_id: AcademicYearId,
        dto: UpdateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        let existing = Self::get_academic_year_by_id(db, year_id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);

        if start_date >= end_date {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Start date must be before end date"
            )));
        }

        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            r#"UPDATE academic_years
               SET name = $1, start_date = $2, end_date = $3, updated_at = now()
               WHERE id = $4
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(&name)
        .bind(start_date)
        .bind(end_date)
        .bind(year_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "An academic year with this name already exists"
                ));
            }
            AppError::from(e)
        })?;

        Ok(year)
    }

    /// Promote a year to current. The previous current year (if any) is
    /// demoted in the same transaction, so readers never observe two
    /// current years.
    #[instrument(skip(db))]
    pub async fn set_current(
        db: &PgPool,
        year_id: AcademicYearId,
    ) -> Result<AcademicYear, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE academic_years SET is_current = FALSE, updated_at = now() WHERE is_current")
            .execute(&mut *tx)
            .await?;

        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            r#"UPDATE academic_years SET is_current = TRUE, updated_at = now()
               WHERE id = $1
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(year_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic year not found")))?;

        tx.commit().await?;

        Ok(year)
    }

    /// Delete an academic year. Years with classes attached cannot be
    /// deleted while students still reference those classes.
    #[instrument(skip(db))]
    pub async fn delete_academic_year(
        db: &PgPool,
        year_id: AcademicYearId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM academic_years WHERE id = $1")
            .bind(year_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow::anyhow!(
                        "Academic year is still referenced by other records"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Academic year not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn dto(name: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> CreateAcademicYearDto {
        CreateAcademicYearDto {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn new_year_is_not_current(pool: PgPool) {
        let year =
            AcademicYearService::create_academic_year(&pool, dto("2025/2026", (2025, 9, 1), (2026, 6, 30)))
                .await
                .unwrap();

        assert!(!year.is_current);
        assert_eq!(year.name, "2025/2026");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rejects_start_after_end(pool: PgPool) {
        let err =
            AcademicYearService::create_academic_year(&pool, dto("bad", (2026, 6, 30), (2025, 9, 1)))
                .await
                .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_name_is_a_conflict(pool: PgPool) {
        AcademicYearService::create_academic_year(&pool, dto("2025/2026", (2025, 9, 1), (2026, 6, 30)))
            .await
            .unwrap();

        let err =
            AcademicYearService::create_academic_year(&pool, dto("2025/2026", (2026, 9, 1), (2027, 6, 30)))
                .await
                .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn set_current_demotes_previous(pool: PgPool) {
        let first =
            AcademicYearService::create_academic_year(&pool, dto("2024/2025", (2024, 9, 1), (2025, 6, 30)))
                .await
                .unwrap();
        let second =
            AcademicYearService::create_academic_year(&pool, dto("2025/2026", (2025, 9, 1), (2026, 6, 30)))
                .await
                .unwrap();

        AcademicYearService::set_current(&pool, first.id).await.unwrap();
        AcademicYearService::set_current(&pool, second.id).await.unwrap();

        let current = AcademicYearService::get_current_academic_year(&pool)
            .await
            .unwrap();
        assert_eq!(current.id, second.id);

        // The single-current invariant holds in the table itself.
        let current_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM academic_years WHERE is_current")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(current_count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn current_is_not_found_when_unset(pool: PgPool) {
        let err = AcademicYearService::get_current_academic_year(&pool)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_missing_year_is_not_found(pool: PgPool) {
        let err = AcademicYearService::delete_academic_year(&pool, AcademicYearId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
