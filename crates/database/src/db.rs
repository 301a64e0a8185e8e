use crate::connection::DbOptions;
use crate::error::DbError;
use crate::ops::{self, Engine};
use crate::tx::Tx;
use configuration::DatabaseSettings;
use core_types::{Args, BindFields, Clock, HardDeleteModel, Model};
use sqlx::postgres::{PgPool, PgQueryResult, PgRow, PgStatement};
use sqlx::{Connection, Executor, FromRow};

/// A handle to the database: a connection pool plus the engine settings.
///
/// `Db` is cheap to clone and safe to share between tasks; clones use the
/// same pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    engine: Engine,
}

async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}

impl Db {
    fn new(pool: PgPool, opts: &DbOptions) -> Self {
        Self {
            pool,
            engine: Engine::from(opts),
        }
    }

    /// Opens a pool for `url` and checks that the server is reachable.
    pub async fn connect(url: &str, opts: DbOptions) -> Result<Self, DbError> {
        tracing::info!(
            driver = %opts.driver,
            max_connections = opts.max_open_connections,
            "Connecting to database..."
        );
        let pool = opts.pool_options().connect(url).await.map_err(DbError::Connect)?;
        tracing::info!("Database connection established.");
        Ok(Self::new(pool, &opts))
    }

    /// Wraps an existing pool. The pool is closed if it cannot be pinged.
    pub async fn from_pool(pool: PgPool, opts: DbOptions) -> Result<Self, DbError> {
        if let Err(e) = ping(&pool).await {
            pool.close().await;
            return Err(DbError::Connect(e));
        }
        Ok(Self::new(pool, &opts))
    }

    /// Builds the pool without opening a connection.
    pub fn connect_lazy(url: &str, opts: DbOptions) -> Result<Self, DbError> {
        let pool = opts.pool_options().connect_lazy(url).map_err(DbError::Connect)?;
        Ok(Self::new(pool, &opts))
    }

    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, DbError> {
        Self::connect(&settings.url, DbOptions::from(settings)).await
    }

    /// Closes the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn driver(&self) -> &str {
        &self.engine.driver
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn clock(&self) -> &dyn Clock {
        self.engine.clock.as_ref()
    }

    /// Rewrites `?` placeholders into the driver's syntax.
    pub fn rebind(&self, query: &str) -> String {
        self.engine.rebind(query)
    }

    pub async fn query(&self, sql: &str, args: Args) -> Result<Vec<PgRow>, DbError> {
        ops::fetch_all(&self.pool, sql, args).await
    }

    /// Fetches exactly one row; no row is [`DbError::NotFound`].
    pub async fn query_row(&self, sql: &str, args: Args) -> Result<PgRow, DbError> {
        ops::fetch_one(&self.pool, sql, args).await
    }

    pub async fn exec(&self, sql: &str, args: Args) -> Result<PgQueryResult, DbError> {
        ops::execute(&self.pool, sql, args).await
    }

    pub async fn rebind_query(&self, sql: &str, args: Args) -> Result<Vec<PgRow>, DbError> {
        self.query(&self.rebind(sql), args).await
    }

    pub async fn rebind_query_row(&self, sql: &str, args: Args) -> Result<PgRow, DbError> {
        self.query_row(&self.rebind(sql), args).await
    }

    pub async fn rebind_exec(&self, sql: &str, args: Args) -> Result<PgQueryResult, DbError> {
        self.exec(&self.rebind(sql), args).await
    }

    /// Runs a `:name` query, binding each name from `source`.
    pub async fn named_query<A>(&self, query: &str, source: &A) -> Result<Vec<PgRow>, DbError>
    where
        A: BindFields + Sync + ?Sized,
    {
        ops::named_query(&self.pool, &self.engine, query, source).await
    }

    pub async fn named_exec<A>(&self, query: &str, source: &A) -> Result<PgQueryResult, DbError>
    where
        A: BindFields + Sync + ?Sized,
    {
        ops::named_exec(&self.pool, &self.engine, query, source).await
    }

    /// Fetches one row decoded as `T`; no row is [`DbError::NotFound`].
    pub async fn get<T>(&self, sql: &str, args: Args) -> Result<T, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::get(&self.pool, sql, args).await
    }

    pub async fn get_all<T>(&self, sql: &str, args: Args) -> Result<Vec<T>, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::get_all(&self.pool, sql, args).await
    }

    /// Prepares `sql` on one pooled connection and returns its description.
    pub async fn prepare(&self, sql: &str) -> Result<PgStatement<'static>, DbError> {
        let statement = (&self.pool).prepare(sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    /// Loads the row with `id` into `dest`.
    pub async fn select<M>(&self, dest: &mut M, id: &str) -> Result<(), DbError>
    where
        M: Model + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        ops::select(&self.pool, &self.engine, dest, id).await
    }

    /// Stamps and inserts `model`, storing the generated id on it.
    pub async fn insert<M>(&self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        let t0 = self.engine.clock.now();
        ops::insert(&self.pool, &self.engine, model, t0).await
    }

    /// Inserts every model in one transaction, stamped with the same instant.
    ///
    /// The first failure rolls the transaction back and is returned. Models
    /// inserted before it keep the ids and timestamps assigned in memory even
    /// though none of their rows persist.
    pub async fn insert_batch(&self, models: &mut [&mut dyn Model]) -> Result<(), DbError> {
        let t0 = self.engine.clock.now();
        let mut tx = self.pool.begin().await?;

        for model in models.iter_mut() {
            if let Err(e) = ops::insert(&mut *tx, &self.engine, &mut **model, t0).await {
                tracing::warn!(id = model.id(), error = %e, "batch insert failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "batch rollback failed");
                }
                return Err(e);
            }
        }

        tx.commit().await?;
        tracing::debug!(count = models.len(), "batch inserted");
        Ok(())
    }

    /// Stamps `updated_at` and writes `model`; exactly one row must change.
    pub async fn update<M>(&self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        ops::update(&self.pool, &self.engine, model).await
    }

    /// Soft-deletes `model`, setting its `deleted_at` once the row is marked.
    pub async fn delete<M>(&self, model: &mut M) -> Result<(), DbError>
    where
        M: Model + ?Sized,
    {
        ops::delete(&self.pool, &self.engine, model).await
    }

    pub async fn hard_delete<M>(&self, model: &M) -> Result<(), DbError>
    where
        M: HardDeleteModel + ?Sized,
    {
        ops::hard_delete(&self.pool, &self.engine, model).await
    }

    /// Starts a transaction on one pooled connection.
    pub async fn begin(&self) -> Result<Tx, DbError> {
        let inner = self.pool.begin().await?;
        Ok(Tx::new(inner, self.engine.clone()))
    }
}
