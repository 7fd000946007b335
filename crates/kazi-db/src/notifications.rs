//! Notification mailbox persistence.

use chrono::{DateTime, Utc};
use kazi_models::{Notification, NotificationKind, PageParams, RelatedEntity};
use sqlx::{PgPool, QueryBuilder};

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct NotificationRow {
    notification_id: i64,
    recipient_id: i64,
    title: String,
    message: String,
    kind: String,
    related_type: Option<String>,
    related_id: Option<i64>,
    is_read: bool,
    sent_date: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> DbResult<Notification> {
        Ok(Notification {
            notification_id: self.notification_id,
            recipient_id: self.recipient_id,
            title: self.title,
            message: self.message,
            kind: self.kind.parse().map_err(DbError::Decode)?,
            related_type: self.related_type,
            related_id: self.related_id,
            is_read: self.is_read,
            sent_date: self.sent_date,
        })
    }
}

/// Append a message to a user's mailbox.
pub async fn insert(
    pool: &PgPool,
    recipient_id: i64,
    title: &str,
    message: &str,
    kind: NotificationKind,
    related: Option<&RelatedEntity>,
) -> DbResult<i64> {
    let notification_id: i64 = sqlx::query_scalar(
        "INSERT INTO notifications (recipient_id, title, message, kind, related_type, related_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING notification_id",
    )
    .bind(recipient_id)
    .bind(title)
    .bind(message)
    .bind(kind.as_str())
    .bind(related.map(|r| r.related_type.as_str()))
    .bind(related.map(|r| r.related_id))
    .fetch_one(pool)
    .await?;

    Ok(notification_id)
}

/// List a user's mailbox, optionally filtered by read state, newest first.
pub async fn list_for_recipient(
    pool: &PgPool,
    recipient_id: i64,
    is_read: Option<bool>,
    page: &PageParams,
) -> DbResult<(Vec<Notification>, i64)> {
    let mut count_qb =
        QueryBuilder::new("SELECT COUNT(*) FROM notifications WHERE recipient_id = ");
    count_qb.push_bind(recipient_id);
    if let Some(read) = is_read {
        count_qb.push(" AND is_read = ").push_bind(read);
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new("SELECT * FROM notifications WHERE recipient_id = ");
    qb.push_bind(recipient_id);
    if let Some(read) = is_read {
        qb.push(" AND is_read = ").push_bind(read);
    }
    qb.push(" ORDER BY sent_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<NotificationRow> = qb.build_query_as().fetch_all(pool).await?;
    let notifications = rows
        .into_iter()
        .map(NotificationRow::into_notification)
        .collect::<DbResult<Vec<_>>>()?;

    Ok((notifications, total))
}

/// Mark one notification read, scoped to its recipient. Returns false when
/// the row is not in this user's mailbox. Idempotent: re-marking a read
/// notification succeeds.
pub async fn mark_read(pool: &PgPool, notification_id: i64, recipient_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE notification_id = $1 AND recipient_id = $2",
    )
    .bind(notification_id)
    .bind(recipient_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark every unread notification read. Idempotent; a second call affects
/// zero rows and leaves the unread count at zero.
pub async fn mark_all_read(pool: &PgPool, recipient_id: i64) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete one notification, scoped to its recipient.
pub async fn delete(pool: &PgPool, notification_id: i64, recipient_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        "DELETE FROM notifications WHERE notification_id = $1 AND recipient_id = $2",
    )
    .bind(notification_id)
    .bind(recipient_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Count a user's unread notifications.
pub async fn unread_count(pool: &PgPool, recipient_id: i64) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
