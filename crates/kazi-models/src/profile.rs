//! Role profiles: the 1:1 extensions of a user account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job seeker profile, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSeekerProfile {
    pub seeker_id: i64,
    pub user_id: i64,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employer profile. `is_approved` gates job posting; `approved_by` and
/// `approved_date` are stamped once by the approving admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub employer_id: i64,
    pub user_id: i64,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role-specific profile data attached to a user, serialized as a tagged
/// union so every role is matched exhaustively instead of spread-merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProfileData {
    JobSeeker(JobSeekerProfile),
    Employer(EmployerProfile),
    /// Admins carry no profile beyond the account itself.
    Admin,
}

impl ProfileData {
    /// The seeker profile, when this is one.
    pub fn as_job_seeker(&self) -> Option<&JobSeekerProfile> {
        match self {
            ProfileData::JobSeeker(p) => Some(p),
            _ => None,
        }
    }

    /// The employer profile, when this is one.
    pub fn as_employer(&self) -> Option<&EmployerProfile> {
        match self {
            ProfileData::Employer(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_employer() -> EmployerProfile {
        EmployerProfile {
            employer_id: 7,
            user_id: 3,
            company_name: "Acme Ltd".to_string(),
            industry: None,
            location: None,
            phone_number: None,
            website: None,
            description: None,
            is_approved: false,
            approved_by: None,
            approved_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_union_is_tagged() {
        let json = serde_json::to_value(ProfileData::Employer(sample_employer())).unwrap();
        assert_eq!(json["kind"], "employer");
        assert_eq!(json["company_name"], "Acme Ltd");

        let json = serde_json::to_value(ProfileData::Admin).unwrap();
        assert_eq!(json["kind"], "admin");
    }

    #[test]
    fn test_profile_accessors() {
        let data = ProfileData::Employer(sample_employer());
        assert!(data.as_employer().is_some());
        assert!(data.as_job_seeker().is_none());
    }
}
