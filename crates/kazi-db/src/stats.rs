//! Platform-wide counters for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use crate::error::DbResult;

/// One snapshot of the numbers the admin dashboard shows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub total_users: i64,
    pub job_seekers: i64,
    pub employers: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub successful_matches: i64,
    pub pending_employers: i64,
    pub pending_disputes: i64,
}

/// Gather all counters in one round trip.
pub async fn platform(pool: &PgPool) -> DbResult<PlatformStats> {
    let stats = sqlx::query_as::<_, PlatformStats>(
        "SELECT
            (SELECT COUNT(*) FROM users WHERE is_active = TRUE) AS total_users,
            (SELECT COUNT(*) FROM users WHERE role = 'job-seeker' AND is_active = TRUE) AS job_seekers,
            (SELECT COUNT(*) FROM employers WHERE is_approved = TRUE) AS employers,
            (SELECT COUNT(*) FROM job_postings WHERE is_active = TRUE) AS active_jobs,
            (SELECT COUNT(*) FROM applications) AS total_applications,
            (SELECT COUNT(*) FROM applications WHERE status = 'accepted') AS successful_matches,
            (SELECT COUNT(*) FROM employers WHERE is_approved = FALSE) AS pending_employers,
            (SELECT COUNT(*) FROM disputes WHERE status = 'open') AS pending_disputes",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
