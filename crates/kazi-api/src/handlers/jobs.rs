//! Job posting handlers: public listings, employer CRUD, saved jobs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kazi_db::jobs::{EmployerJobStats, JobFilters, JobPatch, JobWithCompany, NewJob};
use kazi_db::saved_jobs::SavedJob;
use kazi_models::{
    ExperienceLevel, JobPosting, JobType, PageParams, Pagination, SalaryPeriod, UserRole,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::security::validate_job_fields;
use crate::state::AppState;

/// Query parameters for the public job listing.
#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub salary_min: Option<Decimal>,
    #[serde(default)]
    pub salary_max: Option<Decimal>,
    #[serde(default)]
    pub employer_id: Option<i64>,
}

/// Job listing response.
#[derive(Serialize)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<JobWithCompany>,
    pub pagination: Pagination,
}

/// List active jobs with filters (public).
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let page = PageParams::new(query.page, query.limit);
    let filters = JobFilters {
        search: query.search,
        location: query.location,
        category: query.category,
        job_type: query.job_type,
        salary_min: query.salary_min,
        salary_max: query.salary_max,
        employer_id: query.employer_id,
    };

    let (jobs, total) = kazi_db::jobs::list_active(&state.pool, &filters, &page).await?;

    Ok(Json(JobListResponse {
        success: true,
        jobs,
        pagination: Pagination::new(&page, total),
    }))
}

/// Single job response.
#[derive(Serialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: JobWithCompany,
}

/// Get a single job with company details (public). Each view bumps the
/// counter; a failed bump never fails the read.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<JobResponse>> {
    let job = kazi_db::jobs::get_with_company(&state.pool, job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if let Err(e) = kazi_db::jobs::increment_views(&state.pool, job_id).await {
        warn!(job_id, error = %e, "Failed to increment job views");
    }

    Ok(Json(JobResponse { success: true, job }))
}

/// Job creation request.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub job_title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub salary_period: Option<SalaryPeriod>,
    pub location: String,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
}

impl CreateJobRequest {
    fn validate(&self) -> Result<(), String> {
        validate_job_fields(&self.job_title, &self.description, &self.location)?;
        if let Some(salary) = self.salary {
            if salary.is_sign_negative() {
                return Err("Salary must be a positive number".to_string());
            }
        }
        Ok(())
    }
}

/// Created job response.
#[derive(Serialize)]
pub struct CreatedJobResponse {
    pub success: bool,
    pub message: String,
    pub job: JobPosting,
}

/// Create a job posting (approved employers only).
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<CreatedJobResponse>)> {
    user.require_role(&[UserRole::Employer])?;
    request.validate().map_err(ApiError::validation)?;

    let employer = kazi_db::employers::get_by_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employer profile not found"))?;

    if !employer.is_approved {
        return Err(ApiError::forbidden(
            "Employer account pending approval. Cannot post jobs yet.",
        ));
    }

    let job = kazi_db::jobs::insert(
        &state.pool,
        &NewJob {
            employer_id: employer.employer_id,
            job_title: request.job_title.trim().to_string(),
            description: request.description,
            requirements: request.requirements,
            responsibilities: request.responsibilities,
            salary: request.salary,
            salary_period: request.salary_period.unwrap_or_default(),
            location: request.location,
            job_type: request.job_type.unwrap_or_default(),
            category: request.category,
            experience_level: request.experience_level.unwrap_or_default(),
            education_level: request.education_level,
            application_deadline: request.application_deadline,
        },
    )
    .await?;

    info!(job_id = job.job_id, employer_id = employer.employer_id, "Job posted");

    Ok((
        StatusCode::CREATED,
        Json(CreatedJobResponse {
            success: true,
            message: "Job posted successfully".to_string(),
            job,
        }),
    ))
}

/// Job update request. Omitted fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub salary_period: Option<SalaryPeriod>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Updated job response.
#[derive(Serialize)]
pub struct UpdatedJobResponse {
    pub success: bool,
    pub message: String,
    pub job: JobPosting,
}

/// Patch a posting (owner only, through the employer chain).
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<Json<UpdatedJobResponse>> {
    user.require_role(&[UserRole::Employer])?;

    if !kazi_db::jobs::is_owned_by_user(&state.pool, job_id, user.user_id).await? {
        return Err(ApiError::forbidden("Not authorized to update this job"));
    }

    let patch = JobPatch {
        job_title: request.job_title,
        description: request.description,
        requirements: request.requirements,
        responsibilities: request.responsibilities,
        salary: request.salary,
        salary_period: request.salary_period,
        location: request.location,
        job_type: request.job_type,
        category: request.category,
        experience_level: request.experience_level,
        education_level: request.education_level,
        application_deadline: request.application_deadline,
        is_active: request.is_active,
    };

    let job = kazi_db::jobs::update(&state.pool, job_id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(Json(UpdatedJobResponse {
        success: true,
        message: "Job updated successfully".to_string(),
        job,
    }))
}

/// Soft-delete a posting (owner only).
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    user.require_role(&[UserRole::Employer])?;

    if !kazi_db::jobs::is_owned_by_user(&state.pool, job_id, user.user_id).await? {
        return Err(ApiError::forbidden("Not authorized to delete this job"));
    }

    kazi_db::jobs::deactivate(&state.pool, job_id).await?;

    info!(job_id, "Job soft-deleted by owner");

    Ok(Json(MessageResponse::new("Job deleted successfully")))
}

/// Employer job stats response.
#[derive(Serialize)]
pub struct JobStatsResponse {
    pub success: bool,
    pub stats: EmployerJobStats,
}

/// Posting stats for the calling employer.
pub async fn job_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<JobStatsResponse>> {
    user.require_role(&[UserRole::Employer])?;

    let employer = kazi_db::employers::get_by_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employer profile not found"))?;

    let stats = kazi_db::jobs::stats_for_employer(&state.pool, employer.employer_id).await?;

    Ok(Json(JobStatsResponse { success: true, stats }))
}

/// Bookmark a job (seekers only).
pub async fn save_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    user.require_role(&[UserRole::JobSeeker])?;

    let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;

    if kazi_db::jobs::get_with_company(&state.pool, job_id).await?.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }

    match kazi_db::saved_jobs::save(&state.pool, seeker_id, job_id).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Job saved")),
        )),
        Err(e) if e.is_unique_violation() => Err(ApiError::conflict("Job already saved")),
        Err(e) => Err(e.into()),
    }
}

/// Remove a bookmark.
pub async fn unsave_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    user.require_role(&[UserRole::JobSeeker])?;

    let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;

    if !kazi_db::saved_jobs::unsave(&state.pool, seeker_id, job_id).await? {
        return Err(ApiError::not_found("Saved job not found"));
    }

    Ok(Json(MessageResponse::new("Job removed from saved list")))
}

/// Saved jobs response.
#[derive(Serialize)]
pub struct SavedJobsResponse {
    pub success: bool,
    pub jobs: Vec<SavedJob>,
    pub pagination: Pagination,
}

/// List the caller's bookmarks.
pub async fn list_saved_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<SavedJobsResponse>> {
    user.require_role(&[UserRole::JobSeeker])?;

    let seeker_id = kazi_db::seekers::seeker_id_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?;

    let (jobs, total) = kazi_db::saved_jobs::list_for_seeker(&state.pool, seeker_id, &page).await?;

    Ok(Json(SavedJobsResponse {
        success: true,
        jobs,
        pagination: Pagination::new(&page, total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateJobRequest {
        CreateJobRequest {
            job_title: "Backend Engineer".to_string(),
            description: "We are hiring a backend engineer to build and run our core services."
                .to_string(),
            requirements: None,
            responsibilities: None,
            salary: Some(Decimal::new(90_000, 0)),
            salary_period: None,
            location: "Nairobi".to_string(),
            job_type: None,
            category: None,
            experience_level: None,
            education_level: None,
            application_deadline: None,
        }
    }

    #[test]
    fn test_create_job_validation() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn test_create_job_rejects_negative_salary() {
        let mut req = base_request();
        req.salary = Some(Decimal::new(-1, 0));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_job_rejects_short_title() {
        let mut req = base_request();
        req.job_title = "Dev".to_string();
        assert!(req.validate().is_err());
    }
}
