//! User account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::UserRole;

/// Full user row, including the credential hash. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub registration_date: DateTime<Utc>,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Client-safe projection of this account.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            is_active: self.is_active,
            email_verified: self.email_verified,
            registration_date: self.registration_date,
            last_login: self.last_login,
        }
    }
}

/// Client-safe user data, returned by auth and admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub email_verified: bool,
    pub registration_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}
