//! Admin handlers: platform stats, user management, employer moderation,
//! job moderation, and dispute handling.
//!
//! Every route here is admin-gated in the router and re-checked per
//! handler.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kazi_db::disputes::DisputeWithUser;
use kazi_db::employers::PendingEmployer;
use kazi_db::jobs::ModerationJob;
use kazi_db::stats::PlatformStats;
use kazi_db::users::UserFilters;
use kazi_models::{Dispute, DisputeStatus, PageParams, Pagination, PublicUser, UserRole};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::state::AppState;

fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    user.require_role(&[UserRole::Admin])
}

async fn log_admin_action(state: &AppState, admin_id: i64, action: &str, description: String) {
    if let Err(e) =
        kazi_db::activity::record(&state.pool, Some(admin_id), action, Some(&description), None)
            .await
    {
        warn!(action, error = %e, "Failed to record admin activity");
    }
}

/// Platform stats response.
#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: PlatformStats,
}

/// Get platform-wide counters.
pub async fn get_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<StatsResponse>> {
    require_admin(&user)?;

    let stats = kazi_db::stats::platform(&state.pool).await?;

    Ok(Json(StatsResponse { success: true, stats }))
}

/// User listing query.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

/// User listing response.
#[derive(Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}

/// List users with the fixed admin filters.
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    require_admin(&user)?;

    let page = PageParams::new(query.page, query.limit);
    let filters = UserFilters {
        role: query.role,
        is_active: query.is_active,
        search: query.search,
    };

    let (users, total) = kazi_db::users::list(&state.pool, &filters, &page).await?;

    Ok(Json(UserListResponse {
        success: true,
        users,
        pagination: Pagination::new(&page, total),
    }))
}

/// User status update request.
#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

/// Activate or deactivate an account.
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(target_id): Path<i64>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    if !kazi_db::users::set_active(&state.pool, target_id, request.is_active).await? {
        return Err(ApiError::not_found("User not found"));
    }

    let verb = if request.is_active { "activated" } else { "deactivated" };
    info!(target_id, admin = user.user_id, "User {}", verb);
    log_admin_action(
        &state,
        user.user_id,
        "user_status_change",
        format!("User {target_id} {verb}"),
    )
    .await;

    Ok(Json(MessageResponse::new(format!("User {verb} successfully"))))
}

/// Hard-delete a user and everything cascading from it.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(target_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    if target_id == user.user_id {
        return Err(ApiError::validation("Cannot delete your own account"));
    }

    if !kazi_db::users::delete(&state.pool, target_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    info!(target_id, admin = user.user_id, "User deleted");
    log_admin_action(
        &state,
        user.user_id,
        "user_delete",
        format!("User {target_id} deleted"),
    )
    .await;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Pending employers response.
#[derive(Serialize)]
pub struct PendingEmployersResponse {
    pub success: bool,
    pub employers: Vec<PendingEmployer>,
}

/// List employers waiting for approval, oldest first.
pub async fn pending_employers(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PendingEmployersResponse>> {
    require_admin(&user)?;

    let employers = kazi_db::employers::list_pending(&state.pool).await?;

    Ok(Json(PendingEmployersResponse {
        success: true,
        employers,
    }))
}

/// Approve an employer account.
pub async fn approve_employer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(employer_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    state
        .moderation
        .approve_employer(employer_id, user.user_id)
        .await?;

    log_admin_action(
        &state,
        user.user_id,
        "employer_approve",
        format!("Employer {employer_id} approved"),
    )
    .await;

    Ok(Json(MessageResponse::new("Employer approved successfully")))
}

/// Employer rejection request.
#[derive(Debug, Default, Deserialize)]
pub struct RejectEmployerRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reject an employer account, deactivating the underlying user.
pub async fn reject_employer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(employer_id): Path<i64>,
    Json(request): Json<RejectEmployerRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    state
        .moderation
        .reject_employer(employer_id, request.reason.as_deref())
        .await?;

    log_admin_action(
        &state,
        user.user_id,
        "employer_reject",
        format!("Employer {employer_id} rejected"),
    )
    .await;

    Ok(Json(MessageResponse::new("Employer rejected")))
}

/// Moderation job listing query.
#[derive(Debug, Deserialize)]
pub struct AdminJobListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Moderation job listing response.
#[derive(Serialize)]
pub struct AdminJobListResponse {
    pub success: bool,
    pub jobs: Vec<ModerationJob>,
    pub pagination: Pagination,
}

/// List every posting, active or not.
pub async fn list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminJobListQuery>,
) -> ApiResult<Json<AdminJobListResponse>> {
    require_admin(&user)?;

    let page = PageParams::new(query.page, query.limit);
    let (jobs, total) = kazi_db::jobs::list_all(&state.pool, query.is_active, &page).await?;

    Ok(Json(AdminJobListResponse {
        success: true,
        jobs,
        pagination: Pagination::new(&page, total),
    }))
}

/// Job deactivation request.
#[derive(Debug, Default, Deserialize)]
pub struct DeactivateJobRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Force a posting inactive and notify the employer.
pub async fn deactivate_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
    Json(request): Json<DeactivateJobRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&user)?;

    state
        .moderation
        .deactivate_job(job_id, request.reason.as_deref())
        .await?;

    log_admin_action(
        &state,
        user.user_id,
        "job_deactivate",
        format!("Job {job_id} deactivated"),
    )
    .await;

    Ok(Json(MessageResponse::new("Job deactivated successfully")))
}

/// Dispute listing query.
#[derive(Debug, Deserialize)]
pub struct DisputeListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub status: Option<DisputeStatus>,
}

/// Dispute listing response.
#[derive(Serialize)]
pub struct DisputeListResponse {
    pub success: bool,
    pub disputes: Vec<DisputeWithUser>,
    pub pagination: Pagination,
}

/// List disputes with filer details.
pub async fn list_disputes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DisputeListQuery>,
) -> ApiResult<Json<DisputeListResponse>> {
    require_admin(&user)?;

    let page = PageParams::new(query.page, query.limit);
    let (disputes, total) = kazi_db::disputes::list(&state.pool, query.status, &page).await?;

    Ok(Json(DisputeListResponse {
        success: true,
        disputes,
        pagination: Pagination::new(&page, total),
    }))
}

/// Dispute status transition request.
#[derive(Debug, Deserialize)]
pub struct DisputeStatusRequest {
    pub status: DisputeStatus,
}

/// Admin dispute response.
#[derive(Serialize)]
pub struct AdminDisputeResponse {
    pub success: bool,
    pub message: String,
    pub dispute: Dispute,
}

/// Move a dispute to `investigating` or `closed`.
pub async fn set_dispute_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(dispute_id): Path<i64>,
    Json(request): Json<DisputeStatusRequest>,
) -> ApiResult<Json<AdminDisputeResponse>> {
    require_admin(&user)?;

    let dispute = state
        .moderation
        .set_dispute_status(dispute_id, request.status)
        .await?;

    Ok(Json(AdminDisputeResponse {
        success: true,
        message: format!("Dispute moved to {}", request.status),
        dispute,
    }))
}

/// Dispute resolution request.
#[derive(Debug, Deserialize)]
pub struct ResolveDisputeRequest {
    pub resolution: String,
}

/// Resolve a dispute, stamping the resolver exactly once.
pub async fn resolve_dispute(
    State(state): State<AppState>,
    user: AuthUser,
    Path(dispute_id): Path<i64>,
    Json(request): Json<ResolveDisputeRequest>,
) -> ApiResult<Json<AdminDisputeResponse>> {
    require_admin(&user)?;

    if request.resolution.trim().is_empty() {
        return Err(ApiError::validation("Resolution is required"));
    }

    let dispute = state
        .moderation
        .resolve_dispute(dispute_id, request.resolution.trim(), user.user_id)
        .await?;

    log_admin_action(
        &state,
        user.user_id,
        "dispute_resolve",
        format!("Dispute {dispute_id} resolved"),
    )
    .await;

    Ok(Json(AdminDisputeResponse {
        success: true,
        message: "Dispute resolved successfully".to_string(),
        dispute,
    }))
}
