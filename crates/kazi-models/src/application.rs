//! Job application records and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Review status of an application.
///
/// Creation always starts at `Pending`. Employer transitions are
/// deliberately unconstrained beyond that: any status may follow any other.
/// Withdrawal is not a status — a withdrawn application is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    /// Get string representation of the status (matches the stored column value).
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    /// All statuses, in review-pipeline order.
    pub fn all() -> [ApplicationStatus; 6] {
        [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewed,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interview,
            ApplicationStatus::Rejected,
            ApplicationStatus::Accepted,
        ]
    }

    /// Whether the employer has finished with this application.
    pub fn is_decided(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Accepted)
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interview" => Ok(ApplicationStatus::Interview),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An application linking one seeker to one job posting.
///
/// At most one row exists per `(seeker_id, job_id)` pair; the database
/// carries a unique constraint as the final backstop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub application_id: i64,
    pub seeker_id: i64,
    pub job_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-status counts for a seeker's or employer's applications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub shortlisted: i64,
    pub interview: i64,
    pub rejected: i64,
    pub accepted: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ApplicationStatus::all() {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_new_applications_start_pending() {
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
    }

    #[test]
    fn test_decided_statuses() {
        assert!(ApplicationStatus::Accepted.is_decided());
        assert!(ApplicationStatus::Rejected.is_decided());
        assert!(!ApplicationStatus::Shortlisted.is_decided());
        assert!(!ApplicationStatus::Pending.is_decided());
    }
}
