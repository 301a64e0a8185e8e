use crate::error::DbError;
use crate::ops::{self, Engine};
use core_types::{Args, BindFields, Clock, HardDeleteModel, Model};
use sqlx::postgres::{PgQueryResult, PgRow, PgStatement};
use sqlx::{Executor, FromRow, Postgres, Transaction};
use std::fmt;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// A transaction bound to one connection.
///
/// `commit` and `rollback` consume the transaction. Dropping it without
/// either rolls it back.
pub struct Tx {
    inner: Transaction<'static, Postgres>,
    engine: Engine,
    post_commit: Vec<Callback>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("driver", &self.engine.driver)
            .field("post_commit", &self.post_commit.len())
            .finish_non_exhaustive()
    }
}

impl Tx {
    pub(crate) fn new(inner: Transaction<'static, Postgres>, engine: Engine) -> Self {
        Self {
            inner,
            engine,
            post_commit: Vec::new(),
        }
    }

    pub fn driver(&self) -> &str {
        &self.engine.driver
    }

    pub fn clock(&self) -> &dyn Clock {
        self.engine.clock.as_ref()
    }

    pub fn rebind(&self, query: &str) -> String {
        self.engine.rebind(query)
    }

    /// Registers `f` to run after a successful commit. Callbacks run in the
    /// order they were added and never run if the transaction rolls back.
    pub fn post_commit<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_commit.push(Box::new(f));
    }

    pub async fn commit(self) -> Result<(), DbError> {
        let Tx { inner, post_commit, .. } = self;
        inner.commit().await?;

        tracing::debug!(callbacks = post_commit.len(), "transaction committed");
        for callback in post_commit {
            callback();
        }
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        tracing::debug!(dropped_callbacks = self.post_commit.len(), "transaction rolled back");
        Ok(())
    }

    pub async fn query(&mut self, sql: &str, args: Args) -> Result<Vec<PgRow>, DbError> {
        ops::fetch_all(&mut *self.inner, sql, args).await
    }

    pub async fn query_row(&mut self, sql: &str, args: Args) -> Result<PgRow, DbError> {
        ops::fetch_one(&mut *self.inner, sql, args).await
    }

    pub async fn exec(&mut self, sql: &str, args: Args) -> Result<PgQueryResult, DbError> {
        ops::execute(&mut *self.inner, sql, args).await
    }

    pub async fn rebind_query(&mut self, sql: &str, args: Args) -> Result<Vec<PgRow>, DbError> {
        let sql = self.rebind(sql);
        self.query(&sql, args).await
    }

    pub async fn rebind_query_row(&mut self, sql: &str, args: Args) -> Result<PgRow, DbError> {
        let sql = self.rebind(sql);
        self.query_row(&sql, args).await
    }

    pub async fn rebind_exec(&mut self, sql: &str, args: Args) -> Result<PgQueryResult, DbError> {
        let sql = self.rebind(sql);
        self.exec(&sql, args).await
    }

    pub async fn named_query<A>(&mut self, query: &str, source: &A) -> Result<Vec<PgRow>, DbError>
    where
        A: BindFields + Sync + ?Sized,
    {
        ops::named_query(&mut *self.inner, &self.engine, query, source).await
    }

    pub async fn named_exec<A>(&mut self, query: &str, source: &A) -> Result<PgQueryResult, DbError>
    where
        A: BindFields + Sync + ?Sized,
    {
        ops::named_exec(&mut *self.inner, &self.engine, query, source).await
    }

    pub async fn get<T>(&mut self, sql: &str, args: Args) -> Result<T, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::get(&mut *self.inner, sql, args).await
    }

    pub async fn get_all<T>(&mut self, sql: &str, args: Args) -> Result<Vec<T>, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::get_all(&mut *self.inner, sql, args).await
    }

    pub async fn prepare(&mut self, sql: &str) -> Result<PgStatement<'static>, DbError> {
        let statement = (&mut *self.inner).prepare(sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    pub async fn select<M>(&mut self, dest: &mut M, id: &str) -> Result<(), DbError>
    where
        M: Model + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::select(&mut *self.inner, &self.engine, dest, id).await
    }

    pub async fn insert<M>(&mut self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        let t0 = self.engine.clock.now();
        ops::insert(&mut *self.inner, &self.engine, model, t0).await
    }

    pub async fn update<M>(&mut self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        ops::update(&mut *self.inner, &self.engine, model).await
    }

    pub async fn delete<M>(&mut self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        ops::delete(&mut *self.inner, &self.engine, model).await
    }

    pub async fn hard_delete<M>(&mut self, model: &M) -> Result<(), DbError>
    where
        M: HardDeleteModel + ?Sized,
    {
        ops::hard_delete(&mut *self.inner, &self.engine, model).await
    }
}
