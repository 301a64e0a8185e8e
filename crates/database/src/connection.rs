use crate::db::Db;
use crate::error::DbError;
use configuration::DatabaseSettings;
use core_types::{Clock, SystemClock};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// The cap on open connections when none is configured.
pub const MAX_OPEN_CONNECTIONS: u32 = 100;

/// How long a caller waits for a free connection once the cap is reached.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(15);

/// Options applied when a [`Db`] is built.
#[derive(Debug, Clone)]
pub struct DbOptions {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) driver: String,
    pub(crate) rebind_model: bool,
    pub(crate) max_open_connections: u32,
    pub(crate) acquire_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            driver: configuration::settings::DEFAULT_DRIVER.to_string(),
            rebind_model: false,
            max_open_connections: MAX_OPEN_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl DbOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Rebind the select, delete and hard-delete templates from `?` before
    /// running them.
    pub fn with_rebind_model(mut self, rebind: bool) -> Self {
        self.rebind_model = rebind;
        self
    }

    pub fn with_max_open_connections(mut self, max: u32) -> Self {
        self.max_open_connections = max;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub(crate) fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

impl From<&DatabaseSettings> for DbOptions {
    fn from(settings: &DatabaseSettings) -> Self {
        Self::default()
            .with_driver(settings.driver.clone())
            .with_rebind_model(settings.rebind_model)
            .with_max_open_connections(settings.max_connections)
            .with_acquire_timeout(settings.acquire_timeout())
    }
}

/// Connects using the `DATABASE_URL` environment variable.
///
/// A `.env` file in the working directory is loaded first if one exists.
pub async fn connect_from_env(opts: DbOptions) -> Result<Db, DbError> {
    // Load environment variables from the .env file.
    if let Err(e) = dotenv() {
        if !e.not_found() {
            return Err(DbError::ConnectionConfigError(e.to_string()));
        }
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    Db::connect(&database_url, opts).await
}
