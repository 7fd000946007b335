//! Saved-job bookmarks for seekers.

use chrono::{DateTime, Utc};
use kazi_models::PageParams;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::DbResult;

/// A bookmarked posting with enough job data to render the list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SavedJob {
    pub saved_id: i64,
    pub job_id: i64,
    pub saved_date: DateTime<Utc>,
    pub job_title: String,
    pub location: String,
    pub company_name: String,
    pub is_active: bool,
}

/// Bookmark a job. A duplicate surfaces as [`crate::DbError::UniqueViolation`].
pub async fn save(pool: &PgPool, seeker_id: i64, job_id: i64) -> DbResult<i64> {
    let saved_id: i64 = sqlx::query_scalar(
        "INSERT INTO saved_jobs (seeker_id, job_id)
         VALUES ($1, $2)
         RETURNING saved_id",
    )
    .bind(seeker_id)
    .bind(job_id)
    .fetch_one(pool)
    .await?;

    Ok(saved_id)
}

/// Remove a bookmark. Returns false when it was never saved.
pub async fn unsave(pool: &PgPool, seeker_id: i64, job_id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM saved_jobs WHERE seeker_id = $1 AND job_id = $2")
        .bind(seeker_id)
        .bind(job_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List one seeker's bookmarks, newest first.
pub async fn list_for_seeker(
    pool: &PgPool,
    seeker_id: i64,
    page: &PageParams,
) -> DbResult<(Vec<SavedJob>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_jobs WHERE seeker_id = $1")
        .bind(seeker_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, SavedJob>(
        "SELECT sj.saved_id, sj.job_id, sj.saved_date,
                j.job_title, j.location, j.is_active, e.company_name
         FROM saved_jobs sj
         INNER JOIN job_postings j ON sj.job_id = j.job_id
         INNER JOIN employers e ON j.employer_id = e.employer_id
         WHERE sj.seeker_id = $1
         ORDER BY sj.saved_date DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(seeker_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}
