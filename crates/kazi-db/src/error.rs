//! Database error types.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The requested row does not exist.
    #[error("row not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    UniqueViolation,

    /// A stored value could not be decoded into its domain type.
    #[error("invalid stored value: {0}")]
    Decode(String),

    /// Any other driver-level failure.
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::UniqueViolation,
            _ => DbError::Sqlx(e),
        }
    }
}

impl DbError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// True when the error is a duplicate-key rejection.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation)
    }
}
