//! The statement and model operations shared by [`Db`](crate::Db) and
//! [`Tx`](crate::Tx), written once against any PostgreSQL executor.

use crate::connection::DbOptions;
use crate::error::DbError;
use crate::named::bind_named;
use crate::rebind::{rebind, BindType};
use crate::rows::rows_affected;
use chrono::{DateTime, Utc};
use core_types::{Args, BindFields, Clock, HardDeleteModel, Model};
use sqlx::postgres::{PgQueryResult, PgRow};
use sqlx::{FromRow, PgExecutor};
use std::borrow::Cow;
use std::sync::Arc;

/// The per-handle settings every operation needs.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) driver: Arc<str>,
    pub(crate) bind: BindType,
    pub(crate) rebind_model: bool,
}

impl From<&DbOptions> for Engine {
    fn from(opts: &DbOptions) -> Self {
        Self {
            clock: opts.clock.clone(),
            driver: Arc::from(opts.driver.as_str()),
            bind: BindType::for_driver(&opts.driver),
            rebind_model: opts.rebind_model,
        }
    }
}

impl Engine {
    pub(crate) fn rebind(&self, query: &str) -> String {
        rebind(self.bind, query)
    }

    /// A select, delete or hard-delete template ready to run.
    pub(crate) fn model_query<'a>(&self, template: &'a str) -> Cow<'a, str> {
        if self.rebind_model {
            Cow::Owned(self.rebind(template))
        } else {
            Cow::Borrowed(template)
        }
    }
}

pub(crate) async fn fetch_all<'e, E>(exec: E, sql: &str, args: Args) -> Result<Vec<PgRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let args = args.into_arguments()?;
    Ok(sqlx::query_with(sql, args).fetch_all(exec).await?)
}

pub(crate) async fn fetch_one<'e, E>(exec: E, sql: &str, args: Args) -> Result<PgRow, DbError>
where
    E: PgExecutor<'e>,
{
    let args = args.into_arguments()?;
    Ok(sqlx::query_with(sql, args).fetch_one(exec).await?)
}

pub(crate) async fn execute<'e, E>(exec: E, sql: &str, args: Args) -> Result<PgQueryResult, DbError>
where
    E: PgExecutor<'e>,
{
    let args = args.into_arguments()?;
    Ok(sqlx::query_with(sql, args).execute(exec).await?)
}

pub(crate) async fn get<'e, E, T>(exec: E, sql: &str, args: Args) -> Result<T, DbError>
where
    E: PgExecutor<'e>,
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let args = args.into_arguments()?;
    Ok(sqlx::query_as_with::<_, T, _>(sql, args).fetch_one(exec).await?)
}

pub(crate) async fn get_all<'e, E, T>(exec: E, sql: &str, args: Args) -> Result<Vec<T>, DbError>
where
    E: PgExecutor<'e>,
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let args = args.into_arguments()?;
    Ok(sqlx::query_as_with::<_, T, _>(sql, args).fetch_all(exec).await?)
}

pub(crate) async fn named_query<'e, E, A>(
    exec: E,
    engine: &Engine,
    query: &str,
    source: &A,
) -> Result<Vec<PgRow>, DbError>
where
    E: PgExecutor<'e>,
    A: BindFields + ?Sized,
{
    let (sql, args) = bind_named(engine.bind, query, source)?;
    Ok(sqlx::query_with(&sql, args).fetch_all(exec).await?)
}

pub(crate) async fn named_exec<'e, E, A>(
    exec: E,
    engine: &Engine,
    query: &str,
    source: &A,
) -> Result<PgQueryResult, DbError>
where
    E: PgExecutor<'e>,
    A: BindFields + ?Sized,
{
    let (sql, args) = bind_named(engine.bind, query, source)?;
    Ok(sqlx::query_with(&sql, args).execute(exec).await?)
}

/// Stamps `model` with `t0`, runs its insert template and stores the
/// returned id. The timestamps stay on the model if the statement fails.
pub(crate) async fn insert<'e, E, M>(
    exec: E,
    engine: &Engine,
    model: &mut M,
    t0: DateTime<Utc>,
) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
    M: Model + ?Sized,
{
    model.set_created_at(t0);
    model.set_updated_at(t0);
    let (sql, args) = bind_named(engine.bind, model.insert_query(), &*model)?;

    if model.insert_mode().returns_id() {
        let id: String = sqlx::query_scalar_with(&sql, args).fetch_one(exec).await?;
        model.set_id(id);
    } else {
        let result = sqlx::query_with(&sql, args).execute(exec).await?;
        rows_affected(&result, 1)?;
    }

    tracing::debug!(id = model.id(), op = "insert", "model written");
    Ok(())
}

pub(crate) async fn update<'e, E, M>(exec: E, engine: &Engine, model: &mut M) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
    M: Model + ?Sized,
{
    model.set_updated_at(engine.clock.now());
    let (sql, args) = bind_named(engine.bind, model.update_query(), &*model)?;
    let result = sqlx::query_with(&sql, args).execute(exec).await?;
    rows_affected(&result, 1)?;

    tracing::debug!(id = model.id(), op = "update", "model written");
    Ok(())
}

/// Loads the row with `id` into `dest`. `dest` is only replaced once the
/// row is fully decoded.
pub(crate) async fn select<'e, E, M>(exec: E, engine: &Engine, dest: &mut M, id: &str) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
    M: Model + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = engine.model_query(dest.select_query()).into_owned();
    let row = sqlx::query_as::<_, M>(&sql).bind(id).fetch_one(exec).await?;
    *dest = row;

    tracing::debug!(id, op = "select", "model loaded");
    Ok(())
}

/// Soft delete: marks the row deleted at `now`, then the model.
pub(crate) async fn delete<'e, E, M>(exec: E, engine: &Engine, model: &mut M) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
    M: Model + ?Sized,
{
    let t0 = engine.clock.now();
    let sql = engine.model_query(model.delete_query()).into_owned();
    let result = sqlx::query(&sql).bind(t0).bind(model.id()).execute(exec).await?;
    rows_affected(&result, 1)?;
    model.set_deleted_at(Some(t0));

    tracing::debug!(id = model.id(), op = "delete", "model written");
    Ok(())
}

pub(crate) async fn hard_delete<'e, E, M>(exec: E, engine: &Engine, model: &M) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
    M: HardDeleteModel + ?Sized,
{
    let sql = engine.model_query(model.hard_delete_query());
    let result = sqlx::query(&sql).bind(model.id()).execute(exec).await?;
    rows_affected(&result, 1)?;

    tracing::debug!(id = model.id(), op = "hard_delete", "model removed");
    Ok(())
}
