//! Employer profile persistence and the approval workflow queries.

use chrono::{DateTime, Utc};
use kazi_models::EmployerProfile;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::DbResult;

#[derive(sqlx::FromRow)]
struct EmployerRow {
    employer_id: i64,
    user_id: i64,
    company_name: String,
    industry: Option<String>,
    location: Option<String>,
    phone_number: Option<String>,
    website: Option<String>,
    description: Option<String>,
    is_approved: bool,
    approved_by: Option<i64>,
    approved_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployerRow {
    fn into_profile(self) -> EmployerProfile {
        EmployerProfile {
            employer_id: self.employer_id,
            user_id: self.user_id,
            company_name: self.company_name,
            industry: self.industry,
            location: self.location,
            phone_number: self.phone_number,
            website: self.website,
            description: self.description,
            is_approved: self.is_approved,
            approved_by: self.approved_by,
            approved_date: self.approved_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insert an employer profile for a newly registered user. Approval always
/// starts false; only an admin flips it.
pub async fn insert<'e, E>(
    executor: E,
    user_id: i64,
    company_name: &str,
    phone_number: Option<&str>,
    industry: Option<&str>,
    location: Option<&str>,
) -> DbResult<i64>
where
    E: sqlx::PgExecutor<'e>,
{
    let employer_id: i64 = sqlx::query_scalar(
        "INSERT INTO employers (user_id, company_name, phone_number, industry, location, is_approved)
         VALUES ($1, $2, $3, $4, $5, FALSE)
         RETURNING employer_id",
    )
    .bind(user_id)
    .bind(company_name)
    .bind(phone_number)
    .bind(industry)
    .bind(location)
    .fetch_one(executor)
    .await?;

    Ok(employer_id)
}

/// Fetch the profile owned by a user.
pub async fn get_by_user(pool: &PgPool, user_id: i64) -> DbResult<Option<EmployerProfile>> {
    let row = sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(EmployerRow::into_profile))
}

/// Fetch an employer profile by its own ID.
pub async fn get_by_id(pool: &PgPool, employer_id: i64) -> DbResult<Option<EmployerProfile>> {
    let row = sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE employer_id = $1")
        .bind(employer_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(EmployerRow::into_profile))
}

/// Fields an employer may patch on their own profile. `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct EmployerPatch {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Apply a partial update, returning the updated profile.
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    patch: &EmployerPatch,
) -> DbResult<Option<EmployerProfile>> {
    let row = sqlx::query_as::<_, EmployerRow>(
        "UPDATE employers SET
            company_name = COALESCE($1, company_name),
            industry = COALESCE($2, industry),
            location = COALESCE($3, location),
            phone_number = COALESCE($4, phone_number),
            website = COALESCE($5, website),
            description = COALESCE($6, description),
            updated_at = NOW()
         WHERE user_id = $7
         RETURNING *",
    )
    .bind(&patch.company_name)
    .bind(&patch.industry)
    .bind(&patch.location)
    .bind(&patch.phone_number)
    .bind(&patch.website)
    .bind(&patch.description)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(EmployerRow::into_profile))
}

/// Pending employer entry for the admin approval queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingEmployer {
    pub employer_id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub email: String,
    pub registration_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// List unapproved employers joined with their account email, oldest first.
pub async fn list_pending(pool: &PgPool) -> DbResult<Vec<PendingEmployer>> {
    let rows = sqlx::query_as::<_, PendingEmployer>(
        "SELECT e.employer_id, e.user_id, e.company_name, e.industry, e.location,
                e.phone_number, e.website, e.description,
                u.email, u.registration_date, e.created_at
         FROM employers e
         INNER JOIN users u ON e.user_id = u.user_id
         WHERE e.is_approved = FALSE
         ORDER BY e.created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mark an employer approved, stamping the approving admin and the moment.
///
/// Returns false when the employer was already approved (set-once) or does
/// not exist; callers distinguish the two via [`get_by_id`].
pub async fn approve(pool: &PgPool, employer_id: i64, admin_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE employers
         SET is_approved = TRUE, approved_by = $1, approved_date = NOW()
         WHERE employer_id = $2 AND is_approved = FALSE",
    )
    .bind(admin_id)
    .bind(employer_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The user account behind an employer profile, for notifications and the
/// rejection deactivation side effect.
pub async fn user_id_for_employer(pool: &PgPool, employer_id: i64) -> DbResult<Option<i64>> {
    let id: Option<i64> =
        sqlx::query_scalar("SELECT user_id FROM employers WHERE employer_id = $1")
            .bind(employer_id)
            .fetch_optional(pool)
            .await?;

    Ok(id)
}
