//! User-facing dispute filing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use kazi_models::{Dispute, DisputePriority, RelatedEntity};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::security::sanitize_string;
use crate::state::AppState;

/// Dispute filing request.
#[derive(Debug, Deserialize)]
pub struct FileDisputeRequest {
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<DisputePriority>,
    #[serde(default)]
    pub related_type: Option<String>,
    #[serde(default)]
    pub related_id: Option<i64>,
}

impl FileDisputeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("Subject is required".to_string());
        }
        if self.subject.len() > 255 {
            return Err("Subject too long (max 255 characters)".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        match (&self.related_type, self.related_id) {
            (Some(_), None) | (None, Some(_)) => {
                Err("related_type and related_id must be given together".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Filed dispute response.
#[derive(Serialize)]
pub struct DisputeResponse {
    pub success: bool,
    pub message: String,
    pub dispute: Dispute,
}

/// File a dispute. Any authenticated user; starts at `open`.
pub async fn file_dispute(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<FileDisputeRequest>,
) -> ApiResult<(StatusCode, Json<DisputeResponse>)> {
    request.validate().map_err(ApiError::validation)?;

    let related = match (&request.related_type, request.related_id) {
        (Some(related_type), Some(related_id)) => Some(RelatedEntity {
            related_type: related_type.clone(),
            related_id,
        }),
        _ => None,
    };

    let dispute = kazi_db::disputes::insert(
        &state.pool,
        user.user_id,
        &sanitize_string(request.subject.trim()),
        &sanitize_string(request.description.trim()),
        request.priority.unwrap_or_default(),
        related.as_ref(),
    )
    .await?;

    info!(dispute_id = dispute.dispute_id, user_id = user.user_id, "Dispute filed");

    Ok((
        StatusCode::CREATED,
        Json(DisputeResponse {
            success: true,
            message: "Dispute filed successfully".to_string(),
            dispute,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispute_validation() {
        let req = FileDisputeRequest {
            subject: "Unpaid trial shift".to_string(),
            description: "The employer asked for a week of unpaid work.".to_string(),
            priority: None,
            related_type: None,
            related_id: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_dispute_rejects_dangling_related_fields() {
        let req = FileDisputeRequest {
            subject: "Subject".to_string(),
            description: "Description".to_string(),
            priority: None,
            related_type: Some("job".to_string()),
            related_id: None,
        };
        assert!(req.validate().is_err());
    }
}
