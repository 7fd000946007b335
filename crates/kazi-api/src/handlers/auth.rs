//! Registration, login, and password management handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kazi_models::{ProfileData, PublicUser, UserRole};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::security::{is_valid_email, sanitize_string, validate_password_strength};
use crate::state::AppState;

/// Registration request. Role-specific fields are optional and validated
/// per role.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if !is_valid_email(&self.email) {
            return Err("Valid email is required".to_string());
        }
        validate_password_strength(&self.password)?;
        if !self.role.is_registerable() {
            return Err("Invalid role".to_string());
        }
        if self.role == UserRole::Employer
            && self.company_name.as_deref().map_or(true, |n| n.trim().is_empty())
        {
            return Err("Company name is required for employers".to_string());
        }
        if let Some(name) = &self.full_name {
            if name.trim().len() < 3 {
                return Err("Full name must be at least 3 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Auth response carrying the token and the account.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// Register a new user and their role profile in one transaction.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    request.validate().map_err(ApiError::validation)?;

    let email = request.email.trim().to_lowercase();

    let mut tx = state.pool.begin().await.map_err(kazi_db::DbError::from)?;

    if kazi_db::users::email_exists(&mut *tx, &email).await? {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&request.password)?;

    // Derive a username from the email local part plus a random suffix.
    let local = email.split('@').next().unwrap_or("user");
    let username = format!("{}{}", local, uuid::Uuid::new_v4().as_u128() % 1000);

    let user_id =
        kazi_db::users::insert(&mut *tx, &username, &email, &password_hash, request.role).await?;

    match request.role {
        UserRole::JobSeeker => {
            let full_name = request
                .full_name
                .as_deref()
                .map(sanitize_string)
                .unwrap_or_else(|| username.clone());
            kazi_db::seekers::insert(
                &mut *tx,
                user_id,
                &full_name,
                request.phone.as_deref(),
                request.location.as_deref(),
            )
            .await?;
        }
        UserRole::Employer => {
            let company_name = sanitize_string(request.company_name.as_deref().unwrap_or_default());
            kazi_db::employers::insert(
                &mut *tx,
                user_id,
                &company_name,
                request.phone.as_deref(),
                request.industry.as_deref(),
                request.location.as_deref(),
            )
            .await?;
        }
        UserRole::Admin => return Err(ApiError::validation("Invalid role")),
    }

    tx.commit().await.map_err(kazi_db::DbError::from)?;

    let token = state.jwt.issue(user_id, &email, request.role)?;

    let user = kazi_db::users::get_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::internal("Registered user vanished"))?;

    info!(user_id, role = %request.role.as_str(), "User registered");

    if let Err(e) =
        kazi_db::activity::record(&state.pool, Some(user_id), "register", None, None).await
    {
        warn!(error = %e, "Failed to record registration activity");
    }

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Registration successful".to_string(),
            token,
            user: user.to_public(),
        }),
    ))
}

/// Login request. `email` also accepts a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticate and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let user = kazi_db::users::get_by_identifier(&state.pool, request.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled. Contact support."));
    }

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    kazi_db::users::touch_last_login(&state.pool, user.user_id).await?;

    let token = state.jwt.issue(user.user_id, &user.email, user.role)?;

    if let Err(e) =
        kazi_db::activity::record(&state.pool, Some(user.user_id), "login", None, None).await
    {
        warn!(error = %e, "Failed to record login activity");
    }

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: user.to_public(),
    }))
}

/// Current-user response with the role profile attached.
#[derive(Serialize)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: PublicUser,
    pub profile: ProfileData,
}

/// Get the authenticated account with its role profile.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<CurrentUserResponse>> {
    let account = kazi_db::users::get_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let profile = load_profile(&state, &account).await?;

    Ok(Json(CurrentUserResponse {
        success: true,
        user: account.to_public(),
        profile,
    }))
}

pub(crate) async fn load_profile(
    state: &AppState,
    account: &kazi_models::User,
) -> ApiResult<ProfileData> {
    let profile = match account.role {
        UserRole::JobSeeker => kazi_db::seekers::get_by_user(&state.pool, account.user_id)
            .await?
            .map(ProfileData::JobSeeker)
            .ok_or_else(|| ApiError::not_found("Job seeker profile not found"))?,
        UserRole::Employer => kazi_db::employers::get_by_user(&state.pool, account.user_id)
            .await?
            .map(ProfileData::Employer)
            .ok_or_else(|| ApiError::not_found("Employer profile not found"))?,
        UserRole::Admin => ProfileData::Admin,
    };
    Ok(profile)
}

/// Change-password request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Simple success envelope.
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Change the caller's password after verifying the current one.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    validate_password_strength(&request.new_password).map_err(ApiError::validation)?;

    let account = kazi_db::users::get_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&request.current_password, &account.password_hash) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let new_hash = hash_password(&request.new_password)?;
    kazi_db::users::update_password_hash(&state.pool, user.user_id, &new_hash).await?;

    info!(user_id = user.user_id, "Password changed");

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> RegisterRequest {
        RegisterRequest {
            email: "seeker@example.com".to_string(),
            password: "Passw0rd".to_string(),
            role: UserRole::JobSeeker,
            full_name: Some("Jane Doe".to_string()),
            company_name: None,
            phone: None,
            industry: None,
            location: None,
        }
    }

    #[test]
    fn test_register_validation_accepts_seeker() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn test_register_rejects_admin_role() {
        let mut req = base_request();
        req.role = UserRole::Admin;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_requires_company_for_employers() {
        let mut req = base_request();
        req.role = UserRole::Employer;
        req.company_name = None;
        assert!(req.validate().is_err());

        req.company_name = Some("Acme Ltd".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let mut req = base_request();
        req.password = "weak".to_string();
        assert!(req.validate().is_err());
    }
}
