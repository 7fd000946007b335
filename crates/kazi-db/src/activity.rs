//! Activity log writes. Append-only; read by operators, not the API.

use sqlx::PgPool;

use crate::error::DbResult;

/// Record an action. Callers treat this as best-effort and ignore failures.
pub async fn record(
    pool: &PgPool,
    user_id: Option<i64>,
    action: &str,
    description: Option<&str>,
    ip_address: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO activity_logs (user_id, action, description, ip_address)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(action)
    .bind(description)
    .bind(ip_address)
    .execute(pool)
    .await?;

    Ok(())
}
