//! PostgreSQL connection pool initialization.
//!
//! Reads `DATABASE_URL` and builds the shared [`PgPool`]. Called once at
//! startup; the pool is cheaply cloneable and lives in [`crate::state::AppState`].
//!
//! # Panics
//!
//! Panics if `DATABASE_URL` is unset or the connection cannot be established.

use sqlx::PgPool;
use std::env;

pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
