//! Job posting records and their classification enums.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Remote => "remote",
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(JobType::FullTime),
            "part-time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "remote" => Ok(JobType::Remote),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Period the salary figure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hourly,
    #[default]
    Monthly,
    Yearly,
}

impl SalaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryPeriod::Hourly => "hourly",
            SalaryPeriod::Monthly => "monthly",
            SalaryPeriod::Yearly => "yearly",
        }
    }
}

impl FromStr for SalaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(SalaryPeriod::Hourly),
            "monthly" => Ok(SalaryPeriod::Monthly),
            "yearly" => Ok(SalaryPeriod::Yearly),
            other => Err(format!("unknown salary period: {other}")),
        }
    }
}

/// Seniority asked for by a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Intermediate,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(ExperienceLevel::Entry),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "senior" => Ok(ExperienceLevel::Senior),
            "executive" => Ok(ExperienceLevel::Executive),
            other => Err(format!("unknown experience level: {other}")),
        }
    }
}

/// A job posting owned by one employer profile.
///
/// `is_active` is the soft-delete flag: listings only ever show active rows,
/// and deletion flips the flag instead of removing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: i64,
    pub employer_id: i64,
    pub job_title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    pub salary_period: SalaryPeriod,
    pub location: String,
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub experience_level: ExperienceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<NaiveDate>,
    pub posted_date: DateTime<Utc>,
    pub is_active: bool,
    pub views: i64,
    pub applications_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_round_trip() {
        for jt in [
            JobType::FullTime,
            JobType::PartTime,
            JobType::Contract,
            JobType::Internship,
            JobType::Remote,
        ] {
            assert_eq!(jt.as_str().parse::<JobType>().unwrap(), jt);
        }
    }

    #[test]
    fn test_defaults_match_schema_defaults() {
        assert_eq!(JobType::default(), JobType::FullTime);
        assert_eq!(SalaryPeriod::default(), SalaryPeriod::Monthly);
        assert_eq!(ExperienceLevel::default(), ExperienceLevel::Entry);
    }
}
