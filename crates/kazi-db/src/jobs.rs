//! Job posting persistence: listings, ownership-checked mutations, stats.

use chrono::{DateTime, NaiveDate, Utc};
use kazi_models::{ExperienceLevel, JobPosting, JobType, PageParams, SalaryPeriod};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: i64,
    employer_id: i64,
    job_title: String,
    description: String,
    requirements: Option<String>,
    responsibilities: Option<String>,
    salary: Option<Decimal>,
    salary_period: String,
    location: String,
    job_type: String,
    category: Option<String>,
    experience_level: String,
    education_level: Option<String>,
    application_deadline: Option<NaiveDate>,
    posted_date: DateTime<Utc>,
    is_active: bool,
    views: i64,
    applications_count: i64,
}

impl JobRow {
    fn into_posting(self) -> DbResult<JobPosting> {
        Ok(JobPosting {
            job_id: self.job_id,
            employer_id: self.employer_id,
            job_title: self.job_title,
            description: self.description,
            requirements: self.requirements,
            responsibilities: self.responsibilities,
            salary: self.salary,
            salary_period: self.salary_period.parse().map_err(DbError::Decode)?,
            location: self.location,
            job_type: self.job_type.parse().map_err(DbError::Decode)?,
            category: self.category,
            experience_level: self.experience_level.parse().map_err(DbError::Decode)?,
            education_level: self.education_level,
            application_deadline: self.application_deadline,
            posted_date: self.posted_date,
            is_active: self.is_active,
            views: self.views,
            applications_count: self.applications_count,
        })
    }
}

/// Search filters for the public job listing. Every filter maps to a fixed
/// predicate over a known column; values always travel as bind parameters.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub search: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<JobType>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub employer_id: Option<i64>,
}

impl JobFilters {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (j.job_title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR j.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(location) = &self.location {
            qb.push(" AND j.location ILIKE ")
                .push_bind(format!("%{}%", location));
        }
        if let Some(category) = &self.category {
            qb.push(" AND j.category = ").push_bind(category.clone());
        }
        if let Some(job_type) = self.job_type {
            qb.push(" AND j.job_type = ").push_bind(job_type.as_str());
        }
        if let Some(min) = self.salary_min {
            qb.push(" AND j.salary >= ").push_bind(min);
        }
        if let Some(max) = self.salary_max {
            qb.push(" AND j.salary <= ").push_bind(max);
        }
        if let Some(employer_id) = self.employer_id {
            qb.push(" AND j.employer_id = ").push_bind(employer_id);
        }
    }
}

/// A listed job joined with the posting company.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: JobPosting,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct JobWithCompanyRow {
    #[sqlx(flatten)]
    job: JobRow,
    company_name: String,
    company_location: Option<String>,
    company_industry: Option<String>,
    company_website: Option<String>,
    company_description: Option<String>,
}

impl JobWithCompanyRow {
    fn into_listing(self) -> DbResult<JobWithCompany> {
        Ok(JobWithCompany {
            job: self.job.into_posting()?,
            company_name: self.company_name,
            company_location: self.company_location,
            company_industry: self.company_industry,
            company_website: self.company_website,
            company_description: self.company_description,
        })
    }
}

const LISTING_SELECT: &str = "SELECT j.*, e.company_name, \
     e.location AS company_location, e.industry AS company_industry, \
     e.website AS company_website, e.description AS company_description \
     FROM job_postings j INNER JOIN employers e ON j.employer_id = e.employer_id";

/// List active postings with company data, filtered and paginated, newest
/// first.
pub async fn list_active(
    pool: &PgPool,
    filters: &JobFilters,
    page: &PageParams,
) -> DbResult<(Vec<JobWithCompany>, i64)> {
    let mut count_qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM job_postings j \
         INNER JOIN employers e ON j.employer_id = e.employer_id \
         WHERE j.is_active = TRUE",
    );
    filters.apply(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(format!("{LISTING_SELECT} WHERE j.is_active = TRUE"));
    filters.apply(&mut qb);
    qb.push(" ORDER BY j.posted_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<JobWithCompanyRow> = qb.build_query_as().fetch_all(pool).await?;
    let jobs = rows
        .into_iter()
        .map(JobWithCompanyRow::into_listing)
        .collect::<DbResult<Vec<_>>>()?;

    Ok((jobs, total))
}

/// Fetch a single posting with company details, active or not.
pub async fn get_with_company(pool: &PgPool, job_id: i64) -> DbResult<Option<JobWithCompany>> {
    let row = sqlx::query_as::<_, JobWithCompanyRow>(&format!(
        "{LISTING_SELECT} WHERE j.job_id = $1"
    ))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.map(JobWithCompanyRow::into_listing).transpose()
}

/// Increment the view counter. Best-effort; callers ignore the result.
pub async fn increment_views(pool: &PgPool, job_id: i64) -> DbResult<()> {
    sqlx::query("UPDATE job_postings SET views = views + 1 WHERE job_id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Column values for a new posting. Defaults are applied by the caller
/// before insert, so this layer stores exactly what it is given.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: i64,
    pub job_title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub salary: Option<Decimal>,
    pub salary_period: SalaryPeriod,
    pub location: String,
    pub job_type: JobType,
    pub category: Option<String>,
    pub experience_level: ExperienceLevel,
    pub education_level: Option<String>,
    pub application_deadline: Option<NaiveDate>,
}

/// Insert a posting, returning the stored row.
pub async fn insert(pool: &PgPool, job: &NewJob) -> DbResult<JobPosting> {
    let row = sqlx::query_as::<_, JobRow>(
        "INSERT INTO job_postings (
            employer_id, job_title, description, requirements, responsibilities,
            salary, salary_period, location, job_type, category,
            experience_level, education_level, application_deadline
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING *",
    )
    .bind(job.employer_id)
    .bind(&job.job_title)
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(&job.responsibilities)
    .bind(job.salary)
    .bind(job.salary_period.as_str())
    .bind(&job.location)
    .bind(job.job_type.as_str())
    .bind(&job.category)
    .bind(job.experience_level.as_str())
    .bind(&job.education_level)
    .bind(job.application_deadline)
    .fetch_one(pool)
    .await?;

    row.into_posting()
}

/// Verify the caller's user account owns this posting through the employer
/// profile chain.
pub async fn is_owned_by_user(pool: &PgPool, job_id: i64, user_id: i64) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT j.job_id
         FROM job_postings j
         INNER JOIN employers e ON j.employer_id = e.employer_id
         WHERE j.job_id = $1 AND e.user_id = $2",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Fields an employer may patch on a posting. `None` keeps the stored
/// value, so partial payloads never null a column.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub salary: Option<Decimal>,
    pub salary_period: Option<SalaryPeriod>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub category: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub education_level: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Apply a partial update, returning the updated posting.
pub async fn update(pool: &PgPool, job_id: i64, patch: &JobPatch) -> DbResult<Option<JobPosting>> {
    let row = sqlx::query_as::<_, JobRow>(
        "UPDATE job_postings SET
            job_title = COALESCE($1, job_title),
            description = COALESCE($2, description),
            requirements = COALESCE($3, requirements),
            responsibilities = COALESCE($4, responsibilities),
            salary = COALESCE($5, salary),
            salary_period = COALESCE($6, salary_period),
            location = COALESCE($7, location),
            job_type = COALESCE($8, job_type),
            category = COALESCE($9, category),
            experience_level = COALESCE($10, experience_level),
            education_level = COALESCE($11, education_level),
            application_deadline = COALESCE($12, application_deadline),
            is_active = COALESCE($13, is_active)
         WHERE job_id = $14
         RETURNING *",
    )
    .bind(&patch.job_title)
    .bind(&patch.description)
    .bind(&patch.requirements)
    .bind(&patch.responsibilities)
    .bind(patch.salary)
    .bind(patch.salary_period.map(|p| p.as_str()))
    .bind(&patch.location)
    .bind(patch.job_type.map(|t| t.as_str()))
    .bind(&patch.category)
    .bind(patch.experience_level.map(|l| l.as_str()))
    .bind(&patch.education_level)
    .bind(patch.application_deadline)
    .bind(patch.is_active)
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.map(JobRow::into_posting).transpose()
}

/// Soft-delete a posting. The row stays for history and foreign keys.
pub async fn deactivate(pool: &PgPool, job_id: i64) -> DbResult<bool> {
    let result = sqlx::query("UPDATE job_postings SET is_active = FALSE WHERE job_id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Owning employer's user account and the posting title, for moderation
/// notifications.
pub async fn owner_and_title(pool: &PgPool, job_id: i64) -> DbResult<Option<(i64, String)>> {
    let row: Option<(i64, String)> = sqlx::query_as(
        "SELECT e.user_id, j.job_title
         FROM job_postings j
         INNER JOIN employers e ON j.employer_id = e.employer_id
         WHERE j.job_id = $1",
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Aggregate posting stats for one employer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EmployerJobStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_views: i64,
    pub total_applications: i64,
}

/// Compute posting stats for an employer profile.
pub async fn stats_for_employer(pool: &PgPool, employer_id: i64) -> DbResult<EmployerJobStats> {
    let stats = sqlx::query_as::<_, EmployerJobStats>(
        "SELECT
            COUNT(*) AS total_jobs,
            COALESCE(SUM(CASE WHEN is_active THEN 1 ELSE 0 END), 0) AS active_jobs,
            COALESCE(SUM(views), 0)::BIGINT AS total_views,
            (SELECT COUNT(*) FROM applications a
             INNER JOIN job_postings j ON a.job_id = j.job_id
             WHERE j.employer_id = $1) AS total_applications
         FROM job_postings
         WHERE employer_id = $1",
    )
    .bind(employer_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Moderation listing entry: any posting plus the employer's approval state.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationJob {
    #[serde(flatten)]
    pub job: JobPosting,
    pub company_name: String,
    pub employer_approved: bool,
}

#[derive(sqlx::FromRow)]
struct ModerationJobRow {
    #[sqlx(flatten)]
    job: JobRow,
    company_name: String,
    employer_approved: bool,
}

/// List every posting for the admin console, optionally filtered by the
/// active flag.
pub async fn list_all(
    pool: &PgPool,
    is_active: Option<bool>,
    page: &PageParams,
) -> DbResult<(Vec<ModerationJob>, i64)> {
    let mut count_qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM job_postings j \
         INNER JOIN employers e ON j.employer_id = e.employer_id \
         WHERE 1=1",
    );
    if let Some(active) = is_active {
        count_qb.push(" AND j.is_active = ").push_bind(active);
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(
        "SELECT j.*, e.company_name, e.is_approved AS employer_approved \
         FROM job_postings j \
         INNER JOIN employers e ON j.employer_id = e.employer_id \
         WHERE 1=1",
    );
    if let Some(active) = is_active {
        qb.push(" AND j.is_active = ").push_bind(active);
    }
    qb.push(" ORDER BY j.posted_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<ModerationJobRow> = qb.build_query_as().fetch_all(pool).await?;
    let jobs = rows
        .into_iter()
        .map(|r| {
            Ok(ModerationJob {
                job: r.job.into_posting()?,
                company_name: r.company_name,
                employer_approved: r.employer_approved,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok((jobs, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_filters_compose_fixed_predicates() {
        let filters = JobFilters {
            search: Some("engineer".to_string()),
            location: Some("Nairobi".to_string()),
            category: None,
            job_type: Some(JobType::FullTime),
            salary_min: Some(Decimal::new(50_000, 0)),
            salary_max: None,
            employer_id: None,
        };

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_postings j WHERE j.is_active = TRUE");
        filters.apply(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("j.job_title ILIKE"));
        assert!(sql.contains("j.location ILIKE"));
        assert!(sql.contains("j.job_type ="));
        assert!(sql.contains("j.salary >="));
        assert!(!sql.contains("j.salary <="));
        assert!(!sql.contains("j.category"));
        // Values travel as binds, never spliced into the SQL text.
        assert!(!sql.contains("engineer"));
        assert!(!sql.contains("Nairobi"));
    }

    #[test]
    fn test_empty_filters_add_nothing() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM job_postings j WHERE j.is_active = TRUE");
        JobFilters::default().apply(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM job_postings j WHERE j.is_active = TRUE"
        );
    }
}
