//! Deadlines and the request-scoped database handle.

use crate::db::Db;
use crate::error::DbError;
use std::future::Future;
use std::time::Duration;

/// The deadline applied by [`with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

tokio::task_local! {
    static CURRENT_DB: Db;
}

/// Runs `fut` under [`DEFAULT_TIMEOUT`].
pub async fn with_timeout<F, T>(fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    with_deadline(DEFAULT_TIMEOUT, fut).await
}

/// Runs `fut`, giving up with [`DbError::Timeout`] once `limit` elapses.
///
/// The unfinished future is dropped, which cancels the statement it was
/// driving.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout = ?limit, "database operation timed out");
            Err(DbError::Timeout(limit))
        }
    }
}

/// Runs `fut` with `db` available through [`current`].
pub async fn scope<F>(db: Db, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_DB.scope(db, fut).await
}

/// The handle installed by the enclosing [`scope`], if any.
pub fn current() -> Option<Db> {
    CURRENT_DB.try_with(Db::clone).ok()
}
