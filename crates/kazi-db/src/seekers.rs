//! Job seeker profile persistence.

use chrono::{DateTime, Utc};
use kazi_models::JobSeekerProfile;
use sqlx::PgPool;

use crate::error::DbResult;

#[derive(sqlx::FromRow)]
struct SeekerRow {
    seeker_id: i64,
    user_id: i64,
    full_name: String,
    phone_number: Option<String>,
    location: Option<String>,
    education: Option<String>,
    experience: Option<String>,
    skills: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SeekerRow {
    fn into_profile(self) -> JobSeekerProfile {
        JobSeekerProfile {
            seeker_id: self.seeker_id,
            user_id: self.user_id,
            full_name: self.full_name,
            phone_number: self.phone_number,
            location: self.location,
            education: self.education,
            experience: self.experience,
            skills: self.skills,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insert a seeker profile for a newly registered user.
pub async fn insert<'e, E>(
    executor: E,
    user_id: i64,
    full_name: &str,
    phone_number: Option<&str>,
    location: Option<&str>,
) -> DbResult<i64>
where
    E: sqlx::PgExecutor<'e>,
{
    let seeker_id: i64 = sqlx::query_scalar(
        "INSERT INTO job_seekers (user_id, full_name, phone_number, location)
         VALUES ($1, $2, $3, $4)
         RETURNING seeker_id",
    )
    .bind(user_id)
    .bind(full_name)
    .bind(phone_number)
    .bind(location)
    .fetch_one(executor)
    .await?;

    Ok(seeker_id)
}

/// Fetch the profile owned by a user.
pub async fn get_by_user(pool: &PgPool, user_id: i64) -> DbResult<Option<JobSeekerProfile>> {
    let row = sqlx::query_as::<_, SeekerRow>("SELECT * FROM job_seekers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(SeekerRow::into_profile))
}

/// Resolve a user to their seeker ID, when they have one.
pub async fn seeker_id_for_user<'e, E>(executor: E, user_id: i64) -> DbResult<Option<i64>>
where
    E: sqlx::PgExecutor<'e>,
{
    let id: Option<i64> = sqlx::query_scalar("SELECT seeker_id FROM job_seekers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    Ok(id)
}

/// Fields a seeker may patch on their own profile. `None` keeps the stored
/// value (COALESCE semantics), so a partial payload never nulls a column.
#[derive(Debug, Clone, Default)]
pub struct SeekerPatch {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub bio: Option<String>,
}

/// Apply a partial update, returning the updated profile.
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    patch: &SeekerPatch,
) -> DbResult<Option<JobSeekerProfile>> {
    let row = sqlx::query_as::<_, SeekerRow>(
        "UPDATE job_seekers SET
            full_name = COALESCE($1, full_name),
            phone_number = COALESCE($2, phone_number),
            location = COALESCE($3, location),
            education = COALESCE($4, education),
            experience = COALESCE($5, experience),
            skills = COALESCE($6, skills),
            bio = COALESCE($7, bio),
            updated_at = NOW()
         WHERE user_id = $8
         RETURNING *",
    )
    .bind(&patch.full_name)
    .bind(&patch.phone_number)
    .bind(&patch.location)
    .bind(&patch.education)
    .bind(&patch.experience)
    .bind(&patch.skills)
    .bind(&patch.bio)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(SeekerRow::into_profile))
}
