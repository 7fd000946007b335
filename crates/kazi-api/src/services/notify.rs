//! Notification sink.
//!
//! Domain operations call [`Notifier::send`] as a side effect. Delivery is
//! best-effort: a failed insert is logged and swallowed so it can never
//! fail or roll back the operation that triggered it.

use sqlx::PgPool;
use tracing::warn;

use kazi_models::{NotificationKind, RelatedEntity};

use crate::metrics;

/// Writes to the per-user notification mailbox.
#[derive(Clone)]
pub struct Notifier {
    pool: PgPool,
}

impl Notifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to `recipient_id`'s mailbox. Fire-and-forget.
    pub async fn send(
        &self,
        recipient_id: i64,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) {
        self.send_related(recipient_id, title, message, kind, None)
            .await;
    }

    /// Like [`send`](Self::send), tagged with the entity the message concerns.
    pub async fn send_related(
        &self,
        recipient_id: i64,
        title: &str,
        message: &str,
        kind: NotificationKind,
        related: Option<RelatedEntity>,
    ) {
        match kazi_db::notifications::insert(
            &self.pool,
            recipient_id,
            title,
            message,
            kind,
            related.as_ref(),
        )
        .await
        {
            Ok(_) => metrics::record_notification_sent(kind.as_str()),
            Err(e) => {
                warn!(
                    recipient_id,
                    title,
                    error = %e,
                    "Failed to deliver notification"
                );
            }
        }
    }
}
