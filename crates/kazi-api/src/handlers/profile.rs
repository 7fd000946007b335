//! Profile handlers: own profile, partial updates, public views.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use kazi_db::employers::EmployerPatch;
use kazi_db::seekers::SeekerPatch;
use kazi_models::{ProfileData, PublicUser, UserRole};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::load_profile;
use crate::security::sanitize_string;
use crate::state::AppState;

/// Own-profile response.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
    pub profile: ProfileData,
}

/// Get the caller's account and role profile.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let account = kazi_db::users::get_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let profile = load_profile(&state, &account).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: account.to_public(),
        profile,
    }))
}

/// Profile patch request. Fields apply to whichever role profile the
/// caller holds; omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    // Seeker fields
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    // Employer fields
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    // Shared fields
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl UpdateProfileRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            let len = name.trim().len();
            if !(3..=100).contains(&len) {
                return Err("Name must be 3-100 characters".to_string());
            }
        }
        if let Some(company) = &self.company_name {
            if company.trim().is_empty() {
                return Err("Company name cannot be empty".to_string());
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > 1000 {
                return Err("Bio too long (max 1000 characters)".to_string());
            }
        }
        Ok(())
    }
}

/// Updated-profile response.
#[derive(Serialize)]
pub struct UpdatedProfileResponse {
    pub success: bool,
    pub message: String,
    pub profile: ProfileData,
}

/// Patch the caller's role profile.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UpdatedProfileResponse>> {
    request.validate().map_err(ApiError::validation)?;

    let clean = |v: &Option<String>| v.as_deref().map(sanitize_string);

    let profile = match user.role {
        UserRole::JobSeeker => {
            let patch = SeekerPatch {
                full_name: clean(&request.full_name),
                phone_number: clean(&request.phone_number),
                location: clean(&request.location),
                education: clean(&request.education),
                experience: clean(&request.experience),
                skills: clean(&request.skills),
                bio: clean(&request.bio),
            };
            kazi_db::seekers::update(&state.pool, user.user_id, &patch)
                .await?
                .map(ProfileData::JobSeeker)
                .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?
        }
        UserRole::Employer => {
            let patch = EmployerPatch {
                company_name: clean(&request.company_name),
                industry: clean(&request.industry),
                location: clean(&request.location),
                phone_number: clean(&request.phone_number),
                website: clean(&request.website),
                description: clean(&request.description),
            };
            kazi_db::employers::update(&state.pool, user.user_id, &patch)
                .await?
                .map(ProfileData::Employer)
                .ok_or_else(|| ApiError::not_found("Employer profile not found"))?
        }
        UserRole::Admin => {
            return Err(ApiError::validation("Admin accounts have no profile"));
        }
    };

    Ok(Json(UpdatedProfileResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        profile,
    }))
}

/// Public profile projection: safe fields only.
#[derive(Serialize)]
pub struct PublicProfileResponse {
    pub success: bool,
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub profile: Option<ProfileData>,
}

/// View another user's public profile. Inactive accounts are invisible;
/// employer profiles only show once approved.
pub async fn public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<PublicProfileResponse>> {
    let account = kazi_db::users::get_by_id(&state.pool, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let profile = match account.role {
        UserRole::JobSeeker => kazi_db::seekers::get_by_user(&state.pool, user_id)
            .await?
            .map(ProfileData::JobSeeker),
        UserRole::Employer => kazi_db::employers::get_by_user(&state.pool, user_id)
            .await?
            .filter(|e| e.is_approved)
            .map(ProfileData::Employer),
        UserRole::Admin => None,
    };

    Ok(Json(PublicProfileResponse {
        success: true,
        user_id: account.user_id,
        username: account.username,
        role: account.role,
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_patch_validation() {
        assert!(UpdateProfileRequest::default().validate().is_ok());

        let req = UpdateProfileRequest {
            full_name: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateProfileRequest {
            bio: Some("x".repeat(1001)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
