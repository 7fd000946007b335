//! Moderation state engine: employer approval, job deactivation, and
//! dispute handling, with their side-effect notifications.
//!
//! Every transition verifies current state at the database before writing.
//! Notifications ride on the [`Notifier`] and never block or undo the
//! transition they announce.

use sqlx::PgPool;
use tracing::info;

use kazi_models::{Dispute, DisputeStatus, NotificationKind};

use crate::error::{ApiError, ApiResult};
use crate::services::Notifier;

/// Admin-driven lifecycle transitions.
#[derive(Clone)]
pub struct ModerationService {
    pool: PgPool,
    notifier: Notifier,
}

impl ModerationService {
    pub fn new(pool: PgPool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    /// Approve an employer: set-once stamp, then a `success` notification.
    ///
    /// Fails with `NotFound` for an unknown employer and `Conflict` when
    /// the stamp is already set — there is no way back to unapproved.
    pub async fn approve_employer(&self, employer_id: i64, admin_id: i64) -> ApiResult<()> {
        let approved = kazi_db::employers::approve(&self.pool, employer_id, admin_id).await?;

        if !approved {
            return match kazi_db::employers::get_by_id(&self.pool, employer_id).await? {
                Some(_) => Err(ApiError::conflict("Employer is already approved")),
                None => Err(ApiError::not_found("Employer not found")),
            };
        }

        if let Some(user_id) =
            kazi_db::employers::user_id_for_employer(&self.pool, employer_id).await?
        {
            self.notifier
                .send(
                    user_id,
                    "Account Approved",
                    "Your employer account has been approved. You can now post jobs!",
                    NotificationKind::Success,
                )
                .await;
        }

        info!(employer_id, admin_id, "Employer approved");
        Ok(())
    }

    /// Reject an employer: an `error` notification carrying the reason,
    /// then deactivation of the underlying account, which blocks login.
    pub async fn reject_employer(&self, employer_id: i64, reason: Option<&str>) -> ApiResult<()> {
        let user_id = kazi_db::employers::user_id_for_employer(&self.pool, employer_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Employer not found"))?;

        let message = format!(
            "Your employer account application was not approved. Reason: {}",
            reason.unwrap_or("Please contact support for more information.")
        );
        self.notifier
            .send(user_id, "Account Rejected", &message, NotificationKind::Error)
            .await;

        kazi_db::users::set_active(&self.pool, user_id, false).await?;

        info!(employer_id, user_id, "Employer rejected and account deactivated");
        Ok(())
    }

    /// Force a posting inactive and tell the owning employer why.
    pub async fn deactivate_job(&self, job_id: i64, reason: Option<&str>) -> ApiResult<()> {
        let owner = kazi_db::jobs::owner_and_title(&self.pool, job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        kazi_db::jobs::deactivate(&self.pool, job_id).await?;

        let (user_id, job_title) = owner;
        let mut message = format!("Your job posting \"{job_title}\" has been deactivated.");
        if let Some(reason) = reason {
            message.push_str(&format!(" Reason: {reason}"));
        }
        self.notifier
            .send(
                user_id,
                "Job Posting Deactivated",
                &message,
                NotificationKind::Warning,
            )
            .await;

        info!(job_id, "Job deactivated by moderation");
        Ok(())
    }

    /// Move a dispute to `investigating` or `closed`.
    ///
    /// `resolved` is only reachable through [`resolve_dispute`](Self::resolve_dispute)
    /// so the resolution stamp cannot be skipped; terminal disputes reject
    /// further changes with `Conflict`.
    pub async fn set_dispute_status(
        &self,
        dispute_id: i64,
        status: DisputeStatus,
    ) -> ApiResult<Dispute> {
        if !matches!(status, DisputeStatus::Investigating | DisputeStatus::Closed) {
            return Err(ApiError::validation(
                "Status must be 'investigating' or 'closed'",
            ));
        }

        match kazi_db::disputes::set_status(&self.pool, dispute_id, status).await? {
            Some(dispute) => Ok(dispute),
            None => match kazi_db::disputes::get_by_id(&self.pool, dispute_id).await? {
                Some(_) => Err(ApiError::conflict(
                    "Dispute is already resolved or closed",
                )),
                None => Err(ApiError::not_found("Dispute not found")),
            },
        }
    }

    /// Resolve a dispute, stamping resolver and date exactly once, and
    /// notify the filer.
    pub async fn resolve_dispute(
        &self,
        dispute_id: i64,
        resolution: &str,
        admin_id: i64,
    ) -> ApiResult<Dispute> {
        let dispute = match kazi_db::disputes::resolve(&self.pool, dispute_id, resolution, admin_id)
            .await?
        {
            Some(dispute) => dispute,
            None => {
                return match kazi_db::disputes::get_by_id(&self.pool, dispute_id).await? {
                    Some(_) => Err(ApiError::conflict("Dispute is already resolved or closed")),
                    None => Err(ApiError::not_found("Dispute not found")),
                }
            }
        };

        self.notifier
            .send(
                dispute.user_id,
                "Dispute Resolved",
                &format!(
                    "Your dispute \"{}\" has been resolved: {resolution}",
                    dispute.subject
                ),
                NotificationKind::Info,
            )
            .await;

        info!(dispute_id, admin_id, "Dispute resolved");
        Ok(dispute)
    }
}
