//! Notification mailbox handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use kazi_models::{Notification, PageParams, Pagination};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::state::AppState;

/// Mailbox listing query.
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub is_read: Option<bool>,
}

/// Mailbox listing response.
#[derive(Serialize)]
pub struct NotificationListResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
}

/// List the caller's notifications, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> ApiResult<Json<NotificationListResponse>> {
    let page = PageParams::new(query.page, query.limit);
    let (notifications, total) =
        kazi_db::notifications::list_for_recipient(&state.pool, user.user_id, query.is_read, &page)
            .await?;

    Ok(Json(NotificationListResponse {
        success: true,
        notifications,
        pagination: Pagination::new(&page, total),
    }))
}

/// Unread count response.
#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub success: bool,
    pub count: i64,
}

/// Count the caller's unread notifications.
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = kazi_db::notifications::unread_count(&state.pool, user.user_id).await?;
    Ok(Json(UnreadCountResponse { success: true, count }))
}

/// Mark one notification read. Only the recipient can.
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !kazi_db::notifications::mark_read(&state.pool, notification_id, user.user_id).await? {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// Mark the caller's whole mailbox read. Idempotent.
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    kazi_db::notifications::mark_all_read(&state.pool, user.user_id).await?;
    Ok(Json(MessageResponse::new("All notifications marked as read")))
}

/// Delete one notification. Only the recipient can.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !kazi_db::notifications::delete(&state.pool, notification_id, user.user_id).await? {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(MessageResponse::new("Notification deleted")))
}
