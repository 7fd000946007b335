//! User account persistence.

use chrono::{DateTime, Utc};
use kazi_models::{PageParams, PublicUser, User, UserRole};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "user_id, username, email, password_hash, role, \
                            registration_date, is_active, email_verified, last_login";

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    registration_date: DateTime<Utc>,
    is_active: bool,
    email_verified: bool,
    last_login: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> DbResult<User> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: kazi_models::ParseRoleError| DbError::decode(e.to_string()))?;
        Ok(User {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            registration_date: self.registration_date,
            is_active: self.is_active,
            email_verified: self.email_verified,
            last_login: self.last_login,
        })
    }
}

/// Insert a new user row, returning the generated ID.
///
/// A duplicate email or username surfaces as [`DbError::UniqueViolation`].
pub async fn insert<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> DbResult<i64>
where
    E: sqlx::PgExecutor<'e>,
{
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING user_id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(executor)
    .await?;

    Ok(user_id)
}

/// Fetch a user by ID.
pub async fn get_by_id(pool: &PgPool, user_id: i64) -> DbResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(UserRow::into_user).transpose()
}

/// Fetch a user by email or username (login accepts either identifier).
pub async fn get_by_identifier(pool: &PgPool, identifier: &str) -> DbResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    row.map(UserRow::into_user).transpose()
}

/// Check whether an email is already registered.
pub async fn email_exists<'e, E>(executor: E, email: &str) -> DbResult<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let existing: Option<i64> = sqlx::query_scalar("SELECT user_id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(executor)
        .await?;

    Ok(existing.is_some())
}

/// Stamp the last successful login.
pub async fn touch_last_login(pool: &PgPool, user_id: i64) -> DbResult<()> {
    sqlx::query("UPDATE users SET last_login = NOW() WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace a user's password hash.
pub async fn update_password_hash(pool: &PgPool, user_id: i64, password_hash: &str) -> DbResult<()> {
    sqlx::query("UPDATE users SET password_hash = $1 WHERE user_id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Activate or deactivate an account. Returns false when the user is unknown.
pub async fn set_active(pool: &PgPool, user_id: i64, is_active: bool) -> DbResult<bool> {
    let result = sqlx::query("UPDATE users SET is_active = $1 WHERE user_id = $2")
        .bind(is_active)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Hard-delete a user. Role profiles, applications, saved jobs, and
/// notifications go with it via foreign-key cascades.
pub async fn delete(pool: &PgPool, user_id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Admin listing filters. Each maps to a fixed predicate; there is no
/// free-form column selection.
#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl UserFilters {
    /// Append the predicates for every set filter.
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(role) = self.role {
            qb.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(is_active) = self.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// List users for the admin console, filtered and paginated.
pub async fn list(
    pool: &PgPool,
    filters: &UserFilters,
    page: &PageParams,
) -> DbResult<(Vec<PublicUser>, i64)> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
    filters.apply(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1"));
    filters.apply(&mut qb);
    qb.push(" ORDER BY registration_date DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<UserRow> = qb.build_query_as().fetch_all(pool).await?;
    let users = rows
        .into_iter()
        .map(|r| r.into_user().map(|u| u.to_public()))
        .collect::<DbResult<Vec<_>>>()?;

    Ok((users, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filters_compose_fixed_predicates() {
        let filters = UserFilters {
            role: Some(UserRole::Employer),
            is_active: Some(true),
            search: Some("acme".to_string()),
        };

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        filters.apply(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("AND role ="));
        assert!(sql.contains("AND is_active ="));
        assert!(sql.contains("username ILIKE"));
        // Values travel as binds, never spliced into the SQL text.
        assert!(!sql.contains("acme"));
        assert!(!sql.contains("employer"));
    }

    #[test]
    fn test_empty_filters_add_nothing() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        UserFilters::default().apply(&mut qb);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM users WHERE 1=1");
    }
}
