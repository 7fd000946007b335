//! Application persistence: the atomic submission transaction, status
//! transitions, ownership-chain checks, and the listing joins.

use chrono::{DateTime, Utc};
use kazi_models::{Application, ApplicationStatus, ApplicationStatusCounts, PageParams};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};
use thiserror::Error;

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    application_id: i64,
    seeker_id: i64,
    job_id: i64,
    cover_letter: Option<String>,
    status: String,
    application_date: DateTime<Utc>,
    reviewed_date: Option<DateTime<Utc>>,
    reviewed_by: Option<i64>,
    notes: Option<String>,
}

impl ApplicationRow {
    fn into_application(self) -> DbResult<Application> {
        Ok(Application {
            application_id: self.application_id,
            seeker_id: self.seeker_id,
            job_id: self.job_id,
            cover_letter: self.cover_letter,
            status: self.status.parse().map_err(DbError::Decode)?,
            application_date: self.application_date,
            reviewed_date: self.reviewed_date,
            reviewed_by: self.reviewed_by,
            notes: self.notes,
        })
    }
}

/// Why a submission was refused. Each variant maps to a distinct HTTP
/// status at the API boundary.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("job seeker profile not found")]
    SeekerProfileMissing,

    #[error("job not found")]
    JobMissing,

    #[error("job is no longer accepting applications")]
    JobInactive,

    #[error("already applied for this job")]
    AlreadyApplied,

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for SubmitError {
    fn from(e: sqlx::Error) -> Self {
        SubmitError::Db(e.into())
    }
}

/// Submit an application for `user_id` to `job_id`.
///
/// Runs as one transaction: resolve the seeker profile, lock the job row,
/// check the duplicate, insert at `pending`, bump the job's counter. Any
/// failed step rolls the whole thing back, so the counter and the row can
/// never diverge.
///
/// The `FOR UPDATE` lock on the job row serializes concurrent submissions
/// for the same job, which closes the window where two requests both pass
/// the duplicate check; the `(seeker_id, job_id)` unique constraint stays
/// as the backstop and is reported as [`SubmitError::AlreadyApplied`].
pub async fn submit(
    pool: &PgPool,
    user_id: i64,
    job_id: i64,
    cover_letter: Option<&str>,
) -> Result<Application, SubmitError> {
    let mut tx = pool.begin().await?;

    let seeker_id: i64 = crate::seekers::seeker_id_for_user(&mut *tx, user_id)
        .await?
        .ok_or(SubmitError::SeekerProfileMissing)?;

    let job: Option<(i64, bool)> = sqlx::query_as(
        "SELECT job_id, is_active FROM job_postings WHERE job_id = $1 FOR UPDATE",
    )
    .bind(job_id)
    .fetch_optional(&mut *tx)
    .await?;

    match job {
        None => return Err(SubmitError::JobMissing),
        Some((_, false)) => return Err(SubmitError::JobInactive),
        Some((_, true)) => {}
    }

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT application_id FROM applications WHERE seeker_id = $1 AND job_id = $2",
    )
    .bind(seeker_id)
    .bind(job_id)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(SubmitError::AlreadyApplied);
    }

    let row = sqlx::query_as::<_, ApplicationRow>(
        "INSERT INTO applications (seeker_id, job_id, cover_letter, status)
         VALUES ($1, $2, $3, 'pending')
         RETURNING *",
    )
    .bind(seeker_id)
    .bind(job_id)
    .bind(cover_letter)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation => SubmitError::AlreadyApplied,
        other => SubmitError::Db(other),
    })?;

    sqlx::query(
        "UPDATE job_postings SET applications_count = applications_count + 1 WHERE job_id = $1",
    )
    .bind(job_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(row.into_application()?)
}

/// Verify the caller's user account owns the job behind this application,
/// walking the full chain: application -> job posting -> employer -> user.
pub async fn is_job_owned_by_user(
    pool: &PgPool,
    application_id: i64,
    user_id: i64,
) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT a.application_id
         FROM applications a
         INNER JOIN job_postings j ON a.job_id = j.job_id
         INNER JOIN employers e ON j.employer_id = e.employer_id
         WHERE a.application_id = $1 AND e.user_id = $2",
    )
    .bind(application_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Set the review status, stamping the reviewer and the moment. `notes`
/// merges only when provided: a null keeps whatever is stored.
pub async fn update_status(
    pool: &PgPool,
    application_id: i64,
    status: ApplicationStatus,
    notes: Option<&str>,
    reviewer_id: i64,
) -> DbResult<Option<Application>> {
    let row = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET
            status = $1,
            notes = COALESCE($2, notes),
            reviewed_date = NOW(),
            reviewed_by = $3
         WHERE application_id = $4
         RETURNING *",
    )
    .bind(status.as_str())
    .bind(notes)
    .bind(reviewer_id)
    .bind(application_id)
    .fetch_optional(pool)
    .await?;

    row.map(ApplicationRow::into_application).transpose()
}

/// The applicant's user account and the job title, for review
/// notifications.
pub async fn seeker_user_and_job_title(
    pool: &PgPool,
    application_id: i64,
) -> DbResult<Option<(i64, String)>> {
    let row: Option<(i64, String)> = sqlx::query_as(
        "SELECT s.user_id, j.job_title
         FROM applications a
         INNER JOIN job_seekers s ON a.seeker_id = s.seeker_id
         INNER JOIN job_postings j ON a.job_id = j.job_id
         WHERE a.application_id = $1",
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Withdraw (delete) an application owned by this seeker. Returns false
/// when the row does not exist or belongs to someone else.
pub async fn withdraw(pool: &PgPool, application_id: i64, seeker_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        "DELETE FROM applications WHERE application_id = $1 AND seeker_id = $2",
    )
    .bind(application_id)
    .bind(seeker_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// A seeker's application joined with the job and company it targets.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    pub job_type: String,
    pub company_name: String,
}

#[derive(sqlx::FromRow)]
struct ApplicationWithJobRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    job_title: String,
    job_location: String,
    salary: Option<Decimal>,
    job_type: String,
    company_name: String,
}

/// List one seeker's applications, optionally filtered by status, newest
/// first.
pub async fn list_for_seeker(
    pool: &PgPool,
    seeker_id: i64,
    status: Option<ApplicationStatus>,
    page: &PageParams,
) -> DbResult<(Vec<ApplicationWithJob>, i64)> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM applications a WHERE a.seeker_id = ");
    count_qb.push_bind(seeker_id);
    push_status_filter(&mut count_qb, status);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(
        "SELECT a.*, j.job_title, j.location AS job_location, j.salary,
                j.job_type, e.company_name
         FROM applications a
         INNER JOIN job_postings j ON a.job_id = j.job_id
         INNER JOIN employers e ON j.employer_id = e.employer_id
         WHERE a.seeker_id = ",
    );
    qb.push_bind(seeker_id);
    push_status_filter(&mut qb, status);
    qb.push(" ORDER BY a.application_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<ApplicationWithJobRow> = qb.build_query_as().fetch_all(pool).await?;
    let applications = rows
        .into_iter()
        .map(|r| {
            Ok(ApplicationWithJob {
                application: r.application.into_application()?,
                job_title: r.job_title,
                job_location: r.job_location,
                salary: r.salary,
                job_type: r.job_type,
                company_name: r.company_name,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok((applications, total))
}

/// An application joined with the applicant's profile, for the employer's
/// review view.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithSeeker {
    #[serde(flatten)]
    pub application: Application,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeker_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ApplicationWithSeekerRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    full_name: String,
    phone_number: Option<String>,
    seeker_location: Option<String>,
    skills: Option<String>,
    education: Option<String>,
    experience: Option<String>,
}

/// List the applications for one job, optionally filtered by status.
pub async fn list_for_job(
    pool: &PgPool,
    job_id: i64,
    status: Option<ApplicationStatus>,
    page: &PageParams,
) -> DbResult<(Vec<ApplicationWithSeeker>, i64)> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM applications a WHERE a.job_id = ");
    count_qb.push_bind(job_id);
    push_status_filter(&mut count_qb, status);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(
        "SELECT a.*, s.full_name, s.phone_number, s.location AS seeker_location,
                s.skills, s.education, s.experience
         FROM applications a
         INNER JOIN job_seekers s ON a.seeker_id = s.seeker_id
         WHERE a.job_id = ",
    );
    qb.push_bind(job_id);
    push_status_filter(&mut qb, status);
    qb.push(" ORDER BY a.application_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<ApplicationWithSeekerRow> = qb.build_query_as().fetch_all(pool).await?;
    let applications = rows
        .into_iter()
        .map(|r| {
            Ok(ApplicationWithSeeker {
                application: r.application.into_application()?,
                full_name: r.full_name,
                phone_number: r.phone_number,
                seeker_location: r.seeker_location,
                skills: r.skills,
                education: r.education,
                experience: r.experience,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok((applications, total))
}

fn push_status_filter(qb: &mut QueryBuilder<'_, Postgres>, status: Option<ApplicationStatus>) {
    if let Some(status) = status {
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
}

const STATUS_COUNT_COLUMNS: &str =
    "COUNT(*) AS total, \
     COALESCE(SUM(CASE WHEN a.status = 'pending' THEN 1 ELSE 0 END), 0) AS pending, \
     COALESCE(SUM(CASE WHEN a.status = 'reviewed' THEN 1 ELSE 0 END), 0) AS reviewed, \
     COALESCE(SUM(CASE WHEN a.status = 'shortlisted' THEN 1 ELSE 0 END), 0) AS shortlisted, \
     COALESCE(SUM(CASE WHEN a.status = 'interview' THEN 1 ELSE 0 END), 0) AS interview, \
     COALESCE(SUM(CASE WHEN a.status = 'rejected' THEN 1 ELSE 0 END), 0) AS rejected, \
     COALESCE(SUM(CASE WHEN a.status = 'accepted' THEN 1 ELSE 0 END), 0) AS accepted";

#[derive(sqlx::FromRow)]
struct StatusCountsRow {
    total: i64,
    pending: i64,
    reviewed: i64,
    shortlisted: i64,
    interview: i64,
    rejected: i64,
    accepted: i64,
}

impl StatusCountsRow {
    fn into_counts(self) -> ApplicationStatusCounts {
        ApplicationStatusCounts {
            total: self.total,
            pending: self.pending,
            reviewed: self.reviewed,
            shortlisted: self.shortlisted,
            interview: self.interview,
            rejected: self.rejected,
            accepted: self.accepted,
        }
    }
}

/// Per-status counts over one seeker's applications.
pub async fn stats_for_seeker(pool: &PgPool, seeker_id: i64) -> DbResult<ApplicationStatusCounts> {
    let row = sqlx::query_as::<_, StatusCountsRow>(&format!(
        "SELECT {STATUS_COUNT_COLUMNS} FROM applications a WHERE a.seeker_id = $1"
    ))
    .bind(seeker_id)
    .fetch_one(pool)
    .await?;

    Ok(row.into_counts())
}

/// Per-status counts over every application to one employer's postings.
pub async fn stats_for_employer(
    pool: &PgPool,
    employer_id: i64,
) -> DbResult<ApplicationStatusCounts> {
    let row = sqlx::query_as::<_, StatusCountsRow>(&format!(
        "SELECT {STATUS_COUNT_COLUMNS}
         FROM applications a
         INNER JOIN job_postings j ON a.job_id = j.job_id
         WHERE j.employer_id = $1"
    ))
    .bind(employer_id)
    .fetch_one(pool)
    .await?;

    Ok(row.into_counts())
}
