//! Application handlers: submission, listings, review, withdrawal.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use kazi_db::applications::{ApplicationWithJob, ApplicationWithSeeker, SubmitError};
use kazi_models::{
    Application, ApplicationStatus, ApplicationStatusCounts, NotificationKind, PageParams,
    Pagination, UserRole,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::metrics;
use crate::security::MAX_COVER_LETTER_LENGTH;
use crate::state::AppState;

/// Application submission request.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_id: i64,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

impl ApplyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.job_id < 1 {
            return Err("Valid job ID is required".to_string());
        }
        if let Some(letter) = &self.cover_letter {
            if letter.len() > MAX_COVER_LETTER_LENGTH {
                return Err(format!(
                    "Cover letter too long (max {MAX_COVER_LETTER_LENGTH} characters)"
                ));
            }
        }
        Ok(())
    }
}

/// Submitted application response.
#[derive(Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub message: String,
    pub application: Application,
}

/// Apply for a job (seekers only). The whole submission is one atomic
/// transaction in the persistence layer; each precondition failure maps to
/// its own status code.
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<ApplicationResponse>)> {
    user.require_role(&[UserRole::JobSeeker])?;
    request.validate().map_err(ApiError::validation)?;

    let application = kazi_db::applications::submit(
        &state.pool,
        user.user_id,
        request.job_id,
        request.cover_letter.as_deref(),
    )
    .await
    .map_err(|e| match e {
        SubmitError::SeekerProfileMissing => ApiError::not_found("Job seeker profile not found"),
        SubmitError::JobMissing => ApiError::not_found("Job not found"),
        SubmitError::JobInactive => {
            ApiError::validation("Job is no longer accepting applications")
        }
        SubmitError::AlreadyApplied => {
            ApiError::conflict("You have already applied for this job")
        }
        SubmitError::Db(e) => e.into(),
    })?;

    metrics::record_application_submitted();
    info!(
        application_id = application.application_id,
        job_id = request.job_id,
        "Application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            success: true,
            message: "Application submitted successfully".to_string(),
            application,
        }),
    ))
}

/// Listing query: pagination plus an optional status filter.
#[derive(Debug, Deserialize)]
pub struct ApplicationListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationListQuery {
    fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

/// Seeker's own applications response.
#[derive(Serialize)]
pub struct MyApplicationsResponse {
    pub success: bool,
    pub applications: Vec<ApplicationWithJob>,
    pub pagination: Pagination,
}

/// List the caller's applications (seekers only).
pub async fn my_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ApplicationListQuery>,
) -> ApiResult<Json<MyApplicationsResponse>> {
    user.require_role(&[UserRole::JobSeeker])?;

    let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;

    let page = query.page_params();
    let (applications, total) =
        kazi_db::applications::list_for_seeker(&state.pool, seeker_id, query.status, &page).await?;

    Ok(Json(MyApplicationsResponse {
        success: true,
        applications,
        pagination: Pagination::new(&page, total),
    }))
}

/// Applications-for-a-job response.
#[derive(Serialize)]
pub struct JobApplicationsResponse {
    pub success: bool,
    pub applications: Vec<ApplicationWithSeeker>,
    pub pagination: Pagination,
}

/// List the applications for one of the caller's postings (employers only).
pub async fn job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
    Query(query): Query<ApplicationListQuery>,
) -> ApiResult<Json<JobApplicationsResponse>> {
    user.require_role(&[UserRole::Employer])?;

    if !kazi_db::jobs::is_owned_by_user(&state.pool, job_id, user.user_id).await? {
        return Err(ApiError::forbidden(
            "Not authorized to view these applications",
        ));
    }

    let page = query.page_params();
    let (applications, total) =
        kazi_db::applications::list_for_job(&state.pool, job_id, query.status, &page).await?;

    Ok(Json(JobApplicationsResponse {
        success: true,
        applications,
        pagination: Pagination::new(&page, total),
    }))
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Update an application's review status (owning employer only).
///
/// The ownership chain — application, its job, the job's employer profile,
/// the caller's account — is re-verified here, at the moment of the call.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ApplicationResponse>> {
    user.require_role(&[UserRole::Employer])?;

    if !kazi_db::applications::is_job_owned_by_user(&state.pool, application_id, user.user_id)
        .await?
    {
        return Err(ApiError::forbidden(
            "Not authorized to update this application",
        ));
    }

    let application = kazi_db::applications::update_status(
        &state.pool,
        application_id,
        request.status,
        request.notes.as_deref(),
        user.user_id,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Application not found"))?;

    // Tell the applicant. Best-effort, decoupled from the update.
    if let Some((seeker_user, job_title)) =
        kazi_db::applications::seeker_user_and_job_title(&state.pool, application_id).await?
    {
        let kind = match request.status {
            ApplicationStatus::Accepted => NotificationKind::Success,
            ApplicationStatus::Rejected => NotificationKind::Warning,
            _ => NotificationKind::Info,
        };
        state
            .notifier
            .send(
                seeker_user,
                "Application Update",
                &format!(
                    "Your application for \"{job_title}\" is now {}.",
                    request.status
                ),
                kind,
            )
            .await;
    }

    info!(
        application_id,
        status = %request.status,
        reviewer = user.user_id,
        "Application status updated"
    );

    Ok(Json(ApplicationResponse {
        success: true,
        message: "Application status updated".to_string(),
        application,
    }))
}

/// Withdraw an application (owning seeker only). The row is deleted.
pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    user.require_role(&[UserRole::JobSeeker])?;

    let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;

    if !kazi_db::applications::withdraw(&state.pool, application_id, seeker_id).await? {
        return Err(ApiError::forbidden(
            "Application not found or not authorized",
        ));
    }

    info!(application_id, "Application withdrawn");

    Ok(Json(MessageResponse::new(
        "Application withdrawn successfully",
    )))
}

/// Per-status stats response.
#[derive(Serialize)]
pub struct ApplicationStatsResponse {
    pub success: bool,
    pub stats: ApplicationStatusCounts,
}

/// Per-status counts for the caller: over their own applications for
/// seekers, over their postings' applications for employers.
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApplicationStatsResponse>> {
    let stats = match user.role {
        UserRole::JobSeeker => {
            let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;
            kazi_db::applications::stats_for_seeker(&state.pool, seeker_id).await?
        }
        UserRole::Employer => {
            let employer = kazi_db::employers::get_by_user(&state.pool, user.user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Employer profile not found"))?;
            kazi_db::applications::stats_for_employer(&state.pool, employer.employer_id).await?
        }
        UserRole::Admin => ApplicationStatusCounts::default(),
    };

    Ok(Json(ApplicationStatsResponse { success: true, stats }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_request_validation() {
        let req = ApplyRequest { job_id: 1, cover_letter: None };
        assert!(req.validate().is_ok());

        let req = ApplyRequest { job_id: 0, cover_letter: None };
        assert!(req.validate().is_err());

        let req = ApplyRequest {
            job_id: 1,
            cover_letter: Some("x".repeat(MAX_COVER_LETTER_LENGTH + 1)),
        };
        assert!(req.validate().is_err());
    }
}
