use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::{AppError, verify_password};
use rosterly_models::Role;
use rosterly_models::ids::{SessionId, UserId};

use crate::config::jwt::JwtConfig;
use crate::config::lockout::LockoutConfig;
use crate::modules::auth::lockout::{LockoutService, lockout_key};
use crate::modules::users::model::User;
use crate::utils::jwt::create_access_token;

use super::model::{LoginRequest, LoginResponse};

pub struct AuthService;

impl AuthService {
    /// Authenticate a user and establish a session.
    ///
    /// Order of checks: lockout first, then credentials. An inactive account
    /// fails with the same error as a wrong password, and both count toward
    /// the lockout. Success clears the counter, mints a fresh session id
    /// (never reusing a previous one), and records the login time.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        client_ip: &str,
        lockout: &LockoutConfig,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let key = lockout_key(&dto.email, client_ip);

        if LockoutService::too_many_attempts(db, &key, lockout.max_attempts).await? {
            let retry_after = LockoutService::available_in_seconds(db, &key).await?;
            return Err(AppError::too_many_attempts(
                "Too many login attempts. Please try again later.",
                retry_after,
            ));
        }

        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: UserId,
            first_name: String,
            last_name: String,
            email: String,
            password: String,
            role: Role,
            is_active: bool,
            last_login_at: Option<chrono::DateTime<chrono::Utc>>,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(
            r#"SELECT id, first_name, last_name, email, password, role, is_active,
                      last_login_at, created_at, updated_at
               FROM users WHERE lower(email) = lower($1)"#,
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let Some(user) = row else {
            LockoutService::hit(db, &key, lockout.decay_seconds).await?;
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        // Inactive accounts fail exactly like a bad password.
        if !verify_password(&dto.password, &user.password)? || !user.is_active {
            LockoutService::hit(db, &key, lockout.decay_seconds).await?;
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        LockoutService::clear(db, &key).await?;

        let session_id = SessionId::new();
        let expiry_seconds = if dto.remember {
            jwt_config.remember_token_expiry
        } else {
            jwt_config.access_token_expiry
        };

        let mut tx = db.begin().await?;

        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at)
             VALUES ($1, $2, now() + make_interval(secs => $3))",
        )
        .bind(session_id)
        .bind(user.id)
        .bind(expiry_seconds as f64)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let access_token = create_access_token(
            user.id,
            &user.email,
            user.role,
            session_id,
            expiry_seconds,
            jwt_config,
        )?;

        // Only honor local intended paths; anything else falls back to the
        // role's dashboard.
        let redirect_to = dto
            .intended
            .filter(|target| target.starts_with('/'))
            .unwrap_or_else(|| user.role.dashboard_path().to_string());

        Ok(LoginResponse {
            access_token,
            redirect_to,
            user: User {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                role: user.role,
                is_active: user.is_active,
                last_login_at: user.last_login_at,
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        })
    }

    /// End a session. Idempotent: logging out twice is not an error.
    #[instrument(skip(db))]
    pub async fn logout(db: &PgPool, session_id: SessionId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Fetch the authenticated user's profile.
    #[instrument(skip(db))]
    pub async fn me(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, first_name, last_name, email, role, is_active,
                      last_login_at, created_at, updated_at
               FROM users WHERE id = $1"#,
        )
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
    use rosterly_core::hash_password;
    use uuid::Uuid;

    const TEST_IP: &str = "127.0.0.1";

    async fn create_test_user(
        pool: &PgPool,
        email: &str,
        password: &str,
        role: Role,
        is_active: bool,
    ) -> UserId {
        let hashed = hash_password(password).unwrap();
        sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (first_name, last_name, email, password, role, is_active)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind("Test")
        .bind("User")
        .bind(email)
        .bind(&hashed)
        .bind(role)
        .bind(is_active)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn unique_email() -> String {
        format!("user-{}@test.com", Uuid::new_v4())
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember: false,
            intended: None,
        }
    }

    fn test_configs() -> (LockoutConfig, JwtConfig) {
        (
            LockoutConfig::default(),
            JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
                remember_token_expiry: 2_592_000,
            },
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn login_succeeds_with_valid_credentials(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        create_test_user(&pool, &email, "secret123", Role::Teacher, true).await;

        let response =
            AuthService::login(&pool, login_request(&email, "secret123"), TEST_IP, &lockout, &jwt)
                .await
                .unwrap();

        assert!(!response.access_token.is_empty());
        assert_eq!(response.redirect_to, "/teacher/dashboard");
        assert_eq!(response.user.email, email);

        // A session row exists for the new login.
        let sessions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
                .bind(response.user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(sessions, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn redirects_by_role(pool: PgPool) {
        let (lockout, jwt) = test_configs();

        for (role, path) in [
            (Role::SuperAdmin, "/admin/dashboard"),
            (Role::Admin, "/admin/dashboard"),
            (Role::Student, "/student/dashboard"),
        ] {
            let email = unique_email();
            create_test_user(&pool, &email, "secret123", role, true).await;
            let response = AuthService::login(
                &pool,
                login_request(&email, "secret123"),
                TEST_IP,
                &lockout,
                &jwt,
            )
            .await
            .unwrap();
            assert_eq!(response.redirect_to, path);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn intended_url_wins_over_role_default(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        create_test_user(&pool, &email, "secret123", Role::Admin, true).await;

        let mut dto = login_request(&email, "secret123");
        dto.intended = Some("/students/42".to_string());

        let response = AuthService::login(&pool, dto, TEST_IP, &lockout, &jwt)
            .await
            .unwrap();
        assert_eq!(response.redirect_to, "/students/42");

        // Off-site targets are ignored.
        let mut dto = login_request(&email, "secret123");
        dto.intended = Some("https://evil.example.com/".to_string());
        let response = AuthService::login(&pool, dto, TEST_IP, &lockout, &jwt)
            .await
            .unwrap();
        assert_eq!(response.redirect_to, "/admin/dashboard");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn wrong_password_and_inactive_account_fail_identically(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let active = unique_email();
        let inactive = unique_email();
        create_test_user(&pool, &active, "secret123", Role::Student, true).await;
        create_test_user(&pool, &inactive, "secret123", Role::Student, false).await;

        let wrong_password =
            AuthService::login(&pool, login_request(&active, "nope"), TEST_IP, &lockout, &jwt)
                .await
                .unwrap_err();
        let inactive_account = AuthService::login(
            &pool,
            login_request(&inactive, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(inactive_account.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password.error.to_string(),
            inactive_account.error.to_string()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn sixth_attempt_is_locked_out_with_retry_after(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        create_test_user(&pool, &email, "secret123", Role::Student, true).await;

        for _ in 0..5 {
            let err =
                AuthService::login(&pool, login_request(&email, "nope"), TEST_IP, &lockout, &jwt)
                    .await
                    .unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }

        // The 6th attempt hits the lockout, even with the right password.
        let err = AuthService::login(
            &pool,
            login_request(&email, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(err.retry_after.unwrap() > 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn successful_login_clears_the_counter(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        create_test_user(&pool, &email, "secret123", Role::Student, true).await;

        for _ in 0..4 {
            AuthService::login(&pool, login_request(&email, "nope"), TEST_IP, &lockout, &jwt)
                .await
                .unwrap_err();
        }

        AuthService::login(
            &pool,
            login_request(&email, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap();

        // The next failure starts over at 1 instead of tripping the limit.
        let key = lockout_key(&email, TEST_IP);
        AuthService::login(&pool, login_request(&email, "nope"), TEST_IP, &lockout, &jwt)
            .await
            .unwrap_err();
        let attempts: i64 =
            sqlx::query_scalar("SELECT attempts FROM login_attempts WHERE key = $1")
                .bind(&key)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(attempts, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn each_login_creates_a_fresh_session(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        let user_id = create_test_user(&pool, &email, "secret123", Role::Admin, true).await;

        AuthService::login(
            &pool,
            login_request(&email, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap();
        AuthService::login(
            &pool,
            login_request(&email, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap();

        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn logout_deletes_the_session(pool: PgPool) {
        let (lockout, jwt) = test_configs();
        let email = unique_email();
        let user_id = create_test_user(&pool, &email, "secret123", Role::Admin, true).await;

        AuthService::login(
            &pool,
            login_request(&email, "secret123"),
            TEST_IP,
            &lockout,
            &jwt,
        )
        .await
        .unwrap();

        let session_id: SessionId =
            sqlx::query_scalar("SELECT id FROM sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&pool)
                .await
                .unwrap();

        AuthService::logout(&pool, session_id).await.unwrap();

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(remaining, 0);

        // Logging out again is still fine.
        AuthService::logout(&pool, session_id).await.unwrap();
    }
}
