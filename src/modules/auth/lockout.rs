//! Failed-login lockout counters.
//!
//! Counters live in the `login_attempts` table, keyed by
//! `lower(email)|client_ip`. [`LockoutService::hit`] is a single upsert, so
//! two concurrent failures can never both observe a sub-threshold count and
//! slip past the limit. Each hit restarts the decay window; a hit after the
//! window expired starts a fresh count at 1.

use sqlx::PgPool;
use tracing::instrument;

use rosterly_core::AppError;

/// Build the counter key for a login attempt.
pub fn lockout_key(email: &str, client_ip: &str) -> String {
    format!("{}|{}", email.to_lowercase(), client_ip)
}

pub struct LockoutService;

impl LockoutService {
    /// Record a failed attempt. Returns the attempt count now on record.
    #[instrument(skip(db))]
    pub async fn hit(db: &PgPool, key: &str, decay_seconds: i64) -> Result<i64, AppError> {
        let attempts = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO login_attempts (key, attempts, expires_at)
               VALUES ($1, 1, now() + make_interval(secs => $2))
               ON CONFLICT (key) DO UPDATE
               SET attempts = CASE
                       WHEN login_attempts.expires_at <= now() THEN 1
                       ELSE login_attempts.attempts + 1
                   END,
                   expires_at = now() + make_interval(secs => $2)
               RETURNING attempts"#,
        )
        .bind(key)
        .bind(decay_seconds as f64)
        .fetch_one(db)
        .await?;

        Ok(attempts)
    }

    /// Whether the key has reached the attempt limit within its window.
    #[instrument(skip(db))]
    pub async fn too_many_attempts(db: &PgPool, key: &str, max: i64) -> Result<bool, AppError> {
        let locked = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM login_attempts
                   WHERE key = $1 AND attempts >= $2 AND expires_at > now()
               )"#,
        )
        .bind(key)
        .bind(max)
        .fetch_one(db)
        .await?;

        Ok(locked)
    }

    /// Seconds until the key's window expires; 0 when there is no live entry.
    #[instrument(skip(db))]
    pub async fn available_in_seconds(db: &PgPool, key: &str) -> Result<i64, AppError> {
        let seconds = sqlx::query_scalar::<_, i64>(
            r#"SELECT COALESCE(
                   (SELECT CEIL(EXTRACT(EPOCH FROM (expires_at - now())))::BIGINT
                    FROM login_attempts
                    WHERE key = $1 AND expires_at > now()),
                   0
               )"#,
        )
        .bind(key)
        .fetch_one(db)
        .await?;

        Ok(seconds)
    }

    /// Drop the counter for a key (on successful login).
    #[instrument(skip(db))]
    pub async fn clear(db: &PgPool, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM login_attempts WHERE key = $1")
            .bind(key)
            .execute(db)
            .await?;

        Ok(())
    }
}
