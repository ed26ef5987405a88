use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::{AppError, hash_password};
use rosterly_models::ids::UserId;

use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, role, is_active, last_login_at, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Create a user with the given role.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (first_name, last_name, email, password, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
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

        Ok(user)
    }

    /// Get a paginated list of users.
    #[instrument(skip(db))]
    pub async fn get_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(role) = filters.role {
            where_clause.push_str(&format!(" AND role = '{}'", role.as_str()));
        }
        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        let count_query = format!("SELECT COUNT(*) FROM users WHERE TRUE{where_clause}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE TRUE{where_clause}
             ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let users = sqlx::query_as::<_, User>(&data_query).fetch_all(db).await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: filters.pagination.meta(total),
        })
    }

    /// Get a user by ID.
    #[instrument(skip(db))]
    pub async fn get_user_by_id(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(user)
    }

    /// Update profile fields and/or the role. Role reassignment overwrites
    /// the previous role (last assignment wins) and revokes the user's
    /// sessions, since issued tokens carry the old role in their claims.
    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &PgPool,
        user_id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let existing = Self::get_user_by_id(db, user_id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let role = dto.role.unwrap_or(existing.role);
        let role_changed = role != existing.role;

        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET first_name = $1, last_name = $2, email = $3, role = $4, updated_at = now()
               WHERE id = $5
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(role)
        .bind(user_id)
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

        if role_changed {
            sqlx::query("DELETE FROM sessions WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Soft-deactivate a user and revoke their sessions. Accounts are never
    /// hard-deleted through the API.
    #[instrument(skip(db))]
    pub async fn deactivate_user(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users SET is_active = FALSE, updated_at = now()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Reactivate a previously deactivated user.
    #[instrument(skip(db))]
    pub async fn reactivate_user(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users SET is_active = TRUE, updated_at = now()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rosterly_core::PaginationParams;
    use rosterly_models::Role;
    use uuid::Uuid;

    fn create_dto(email: &str, role: Role) -> CreateUserDto {
        CreateUserDto {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role,
        }
    }

    fn unique_email() -> String {
        format!("user-{}@test.com", Uuid::new_v4())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_user_success(pool: PgPool) {
        let email = unique_email();
        let user = UserService::create_user(&pool, create_dto(&email, Role::Teacher))
            .await
            .unwrap();

        assert_eq!(user.email, email);
        assert_eq!(user.role, Role::Teacher);
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_email_is_a_conflict(pool: PgPool) {
        let email = unique_email();
        UserService::create_user(&pool, create_dto(&email, Role::Student))
            .await
            .unwrap();

        // Same email with different case still collides.
        let err = UserService::create_user(&pool, create_dto(&email.to_uppercase(), Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn role_reassignment_is_last_write_wins(pool: PgPool) {
        let user = UserService::create_user(&pool, create_dto(&unique_email(), Role::Student))
            .await
            .unwrap();

        let updated = UserService::update_user(
            &pool,
            user.id,
            UpdateUserDto {
                first_name: None,
                last_name: None,
                email: None,
                role: Some(Role::Teacher),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.role, Role::Teacher);

        // A user has exactly one role; the old one is gone.
        let fetched = UserService::get_user_by_id(&pool, user.id).await.unwrap();
        assert_eq!(fetched.role, Role::Teacher);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn role_reassignment_revokes_sessions(pool: PgPool) {
        let user = UserService::create_user(&pool, create_dto(&unique_email(), Role::Admin))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, now() + interval '30 days')",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

        // Demotion kills live tokens; their claims still carry the old role.
        UserService::update_user(
            &pool,
            user.id,
            UpdateUserDto {
                first_name: None,
                last_name: None,
                email: None,
                role: Some(Role::Student),
            },
        )
        .await
        .unwrap();

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn profile_update_keeps_sessions(pool: PgPool) {
        let user = UserService::create_user(&pool, create_dto(&unique_email(), Role::Teacher))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, now() + interval '1 hour')",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

        UserService::update_user(
            &pool,
            user.id,
            UpdateUserDto {
                first_name: Some("Renamed".to_string()),
                last_name: None,
                email: None,
                role: None,
            },
        )
        .await
        .unwrap();

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deactivate_revokes_sessions(pool: PgPool) {
        let user = UserService::create_user(&pool, create_dto(&unique_email(), Role::Admin))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, now() + interval '1 hour')",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

        let deactivated = UserService::deactivate_user(&pool, user.id).await.unwrap();
        assert!(!deactivated.is_active);

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions, 0);

        let reactivated = UserService::reactivate_user(&pool, user.id).await.unwrap();
        assert!(reactivated.is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_filters_by_role(pool: PgPool) {
        for _ in 0..3 {
            UserService::create_user(&pool, create_dto(&unique_email(), Role::Student))
                .await
                .unwrap();
        }
        UserService::create_user(&pool, create_dto(&unique_email(), Role::Teacher))
            .await
            .unwrap();

        let result = UserService::get_users(
            &pool,
            UserFilterParams {
                role: Some(Role::Student),
                is_active: None,
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();

        assert_eq!(result.meta.total, 3);
        assert!(result.data.iter().all(|u| u.role == Role::Student));
    }
}
