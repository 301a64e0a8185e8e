use crate::error::DbError;
use sqlx::postgres::PgQueryResult;

/// Checks that a statement affected exactly `want` rows.
///
/// Zero rows is always [`DbError::NotFound`], whatever was expected; any
/// other difference is a [`DbError::RowsMismatch`].
pub fn check_rows(got: u64, want: u64) -> Result<(), DbError> {
    if got == want {
        return Ok(());
    }
    if got == 0 {
        return Err(DbError::NotFound);
    }
    Err(DbError::RowsMismatch { got, want })
}

/// [`check_rows`] applied to a statement result.
pub fn rows_affected(result: &PgQueryResult, want: u64) -> Result<(), DbError> {
    check_rows(result.rows_affected(), want)
}
