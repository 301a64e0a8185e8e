use crate::array::ArrayError;
use configuration::error::ConfigError;
use core_types::CoreError;
use std::time::Duration;
use thiserror::Error;

/// PostgreSQL's SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("error connecting to the database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("unexpected number of rows: got {got}, want {want}")]
    RowsMismatch { got: u64, want: u64 },

    #[error(transparent)]
    Bind(#[from] CoreError),

    #[error(transparent)]
    Array(#[from] ArrayError),

    #[error("the operation did not complete within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            e => DbError::Sqlx(e),
        }
    }
}

impl DbError {
    /// True if the target row did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }

    /// True if the statement affected an unexpected, non-zero number of rows.
    pub fn is_rows_mismatch(&self) -> bool {
        matches!(self, DbError::RowsMismatch { .. })
    }

    /// True if the backend rejected the statement with a unique violation (23505).
    pub fn is_unique_violation(&self) -> bool {
        self.database_error()
            .and_then(|e| e.code())
            .is_some_and(|code| code == UNIQUE_VIOLATION)
    }

    /// The backend error, if this error originated in the database.
    pub fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            DbError::Sqlx(sqlx::Error::Database(e)) => Some(e.as_ref()),
            _ => None,
        }
    }
}
