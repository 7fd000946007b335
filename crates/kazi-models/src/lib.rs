//! Shared data models for the KaziConnect backend.
//!
//! This crate provides Serde-serializable types for:
//! - Users, roles, and role profiles
//! - Job postings and applications
//! - Notifications and disputes
//! - Pagination envelopes

pub mod application;
pub mod dispute;
pub mod job;
pub mod notification;
pub mod pagination;
pub mod profile;
pub mod role;
pub mod user;

// Re-export common types
pub use application::{Application, ApplicationStatus, ApplicationStatusCounts};
pub use dispute::{Dispute, DisputePriority, DisputeStatus};
pub use job::{ExperienceLevel, JobPosting, JobType, SalaryPeriod};
pub use notification::{Notification, NotificationKind, RelatedEntity};
pub use pagination::{PageParams, Pagination};
pub use profile::{EmployerProfile, JobSeekerProfile, ProfileData};
pub use role::{ParseRoleError, UserRole};
pub use user::{PublicUser, User};
