//! User roles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Role assigned to a user at registration. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    /// Holder of a [`crate::JobSeekerProfile`].
    JobSeeker,
    /// Holder of an [`crate::EmployerProfile`]; needs admin approval to post jobs.
    Employer,
    /// Platform moderator. Seeded, never self-registered.
    Admin,
}

impl UserRole {
    /// Get string representation of the role (matches the stored column value).
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "job-seeker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }

    /// Roles a caller may register with.
    pub fn is_registerable(&self) -> bool {
        matches!(self, UserRole::JobSeeker | UserRole::Employer)
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job-seeker" => Ok(UserRole::JobSeeker),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::JobSeeker, UserRole::Employer, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_not_registerable() {
        assert!(UserRole::JobSeeker.is_registerable());
        assert!(UserRole::Employer.is_registerable());
        assert!(!UserRole::Admin.is_registerable());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&UserRole::JobSeeker).unwrap();
        assert_eq!(json, "\"job-seeker\"");
    }
}
