//! Dispute persistence and resolution stamps.

use chrono::{DateTime, Utc};
use kazi_models::{Dispute, DisputePriority, DisputeStatus, PageParams, RelatedEntity};
use serde::Serialize;
use sqlx::{PgPool, QueryBuilder};

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct DisputeRow {
    dispute_id: i64,
    user_id: i64,
    subject: String,
    description: String,
    related_type: Option<String>,
    related_id: Option<i64>,
    status: String,
    priority: String,
    filed_date: DateTime<Utc>,
    resolved_date: Option<DateTime<Utc>>,
    resolved_by: Option<i64>,
    resolution: Option<String>,
}

impl DisputeRow {
    fn into_dispute(self) -> DbResult<Dispute> {
        Ok(Dispute {
            dispute_id: self.dispute_id,
            user_id: self.user_id,
            subject: self.subject,
            description: self.description,
            related_type: self.related_type,
            related_id: self.related_id,
            status: self.status.parse().map_err(DbError::Decode)?,
            priority: self.priority.parse().map_err(DbError::Decode)?,
            filed_date: self.filed_date,
            resolved_date: self.resolved_date,
            resolved_by: self.resolved_by,
            resolution: self.resolution,
        })
    }
}

/// File a dispute at `open`, returning the stored row.
pub async fn insert(
    pool: &PgPool,
    user_id: i64,
    subject: &str,
    description: &str,
    priority: DisputePriority,
    related: Option<&RelatedEntity>,
) -> DbResult<Dispute> {
    let row = sqlx::query_as::<_, DisputeRow>(
        "INSERT INTO disputes (user_id, subject, description, priority, related_type, related_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(user_id)
    .bind(subject)
    .bind(description)
    .bind(priority.as_str())
    .bind(related.map(|r| r.related_type.as_str()))
    .bind(related.map(|r| r.related_id))
    .fetch_one(pool)
    .await?;

    row.into_dispute()
}

/// Fetch a dispute by ID.
pub async fn get_by_id(pool: &PgPool, dispute_id: i64) -> DbResult<Option<Dispute>> {
    let row = sqlx::query_as::<_, DisputeRow>("SELECT * FROM disputes WHERE dispute_id = $1")
        .bind(dispute_id)
        .fetch_optional(pool)
        .await?;

    row.map(DisputeRow::into_dispute).transpose()
}

/// A dispute joined with the filer's account, for the admin console.
#[derive(Debug, Clone, Serialize)]
pub struct DisputeWithUser {
    #[serde(flatten)]
    pub dispute: Dispute,
    pub username: String,
    pub email: String,
}

#[derive(sqlx::FromRow)]
struct DisputeWithUserRow {
    #[sqlx(flatten)]
    dispute: DisputeRow,
    username: String,
    email: String,
}

/// List disputes, optionally filtered by status, newest first.
pub async fn list(
    pool: &PgPool,
    status: Option<DisputeStatus>,
    page: &PageParams,
) -> DbResult<(Vec<DisputeWithUser>, i64)> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM disputes d WHERE 1=1");
    if let Some(status) = status {
        count_qb.push(" AND d.status = ").push_bind(status.as_str());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(
        "SELECT d.*, u.username, u.email
         FROM disputes d
         INNER JOIN users u ON d.user_id = u.user_id
         WHERE 1=1",
    );
    if let Some(status) = status {
        qb.push(" AND d.status = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY d.filed_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<DisputeWithUserRow> = qb.build_query_as().fetch_all(pool).await?;
    let disputes = rows
        .into_iter()
        .map(|r| {
            Ok(DisputeWithUser {
                dispute: r.dispute.into_dispute()?,
                username: r.username,
                email: r.email,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok((disputes, total))
}

/// Move a dispute between non-terminal handling states (`open` and
/// `investigating`, or into `closed`). The guard is enforced by the caller;
/// this only refuses to touch rows already past a terminal state.
pub async fn set_status(
    pool: &PgPool,
    dispute_id: i64,
    status: DisputeStatus,
) -> DbResult<Option<Dispute>> {
    let row = sqlx::query_as::<_, DisputeRow>(
        "UPDATE disputes SET status = $1
         WHERE dispute_id = $2 AND status NOT IN ('resolved', 'closed')
         RETURNING *",
    )
    .bind(status.as_str())
    .bind(dispute_id)
    .fetch_optional(pool)
    .await?;

    row.map(DisputeRow::into_dispute).transpose()
}

/// Resolve a dispute, stamping resolver, moment, and resolution text
/// exactly once. Returns `None` when the dispute is already resolved or
/// closed (the stamp is never overwritten).
pub async fn resolve(
    pool: &PgPool,
    dispute_id: i64,
    resolution: &str,
    admin_id: i64,
) -> DbResult<Option<Dispute>> {
    let row = sqlx::query_as::<_, DisputeRow>(
        "UPDATE disputes SET
            status = 'resolved',
            resolution = $1,
            resolved_by = $2,
            resolved_date = NOW()
         WHERE dispute_id = $3 AND status NOT IN ('resolved', 'closed')
         RETURNING *",
    )
    .bind(resolution)
    .bind(admin_id)
    .bind(dispute_id)
    .fetch_optional(pool)
    .await?;

    row.map(DisputeRow::into_dispute).transpose()
}
