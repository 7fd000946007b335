//! Dispute records and resolution lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Handling state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    #[default]
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::Investigating => "investigating",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Closed => "closed",
        }
    }

    /// Whether further status changes are allowed from this state.
    ///
    /// `resolved` and `closed` are terminal: a resolved dispute keeps its
    /// resolution stamp forever, and a closed one stays closed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisputeStatus::Resolved | DisputeStatus::Closed)
    }
}

impl FromStr for DisputeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(DisputeStatus::Open),
            "investigating" => Ok(DisputeStatus::Investigating),
            "resolved" => Ok(DisputeStatus::Resolved),
            "closed" => Ok(DisputeStatus::Closed),
            other => Err(format!("unknown dispute status: {other}")),
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency assigned when a dispute is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisputePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl DisputePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputePriority::Low => "low",
            DisputePriority::Medium => "medium",
            DisputePriority::High => "high",
            DisputePriority::Critical => "critical",
        }
    }
}

impl FromStr for DisputePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(DisputePriority::Low),
            "medium" => Ok(DisputePriority::Medium),
            "high" => Ok(DisputePriority::High),
            "critical" => Ok(DisputePriority::Critical),
            other => Err(format!("unknown dispute priority: {other}")),
        }
    }
}

/// A dispute filed by a user, optionally tagged to a related entity.
///
/// `resolved_by`, `resolved_date`, and `resolution` are populated exactly
/// once, when an admin resolves the dispute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub dispute_id: i64,
    pub user_id: i64,
    pub subject: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<i64>,
    pub status: DisputeStatus,
    pub priority: DisputePriority,
    pub filed_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DisputeStatus::Open,
            DisputeStatus::Investigating,
            DisputeStatus::Resolved,
            DisputeStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<DisputeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DisputeStatus::Open.is_terminal());
        assert!(!DisputeStatus::Investigating.is_terminal());
        assert!(DisputeStatus::Resolved.is_terminal());
        assert!(DisputeStatus::Closed.is_terminal());
    }
}
