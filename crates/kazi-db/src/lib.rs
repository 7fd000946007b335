//! PostgreSQL persistence layer for KaziConnect.
//!
//! One module per table; every function takes a `&PgPool` (or a transaction
//! started from one) so the pool is always injected by the caller, never
//! reached through a global. Status columns are stored as `TEXT` guarded by
//! `CHECK` constraints and decoded into the `kazi-models` enums at the row
//! boundary.

pub mod activity;
pub mod applications;
pub mod disputes;
pub mod employers;
pub mod error;
pub mod jobs;
pub mod notifications;
pub mod saved_jobs;
pub mod seekers;
pub mod stats;
pub mod users;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use error::{DbError, DbResult};

/// Connect to PostgreSQL and run embedded migrations.
///
/// `DATABASE_URL` must be set; the pool bounds are tuned for a small
/// request-per-call API service.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Insert the bootstrap admin account when no user with this email exists.
///
/// The password hash is produced by the caller; this layer never sees
/// plaintext credentials.
pub async fn seed_admin(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> DbResult<()> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, role, is_active, email_verified)
         VALUES ($1, $2, $3, 'admin', TRUE, TRUE)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(email = %email, "Seeded admin account");
    }

    Ok(())
}
