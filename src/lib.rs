//! # Sequel
//!
//! A PostgreSQL persistence layer for models that share an id, creation and
//! update timestamps and a soft-delete marker.
//!
//! The workspace is layered:
//!
//! - `core-types`: the model contract, the clock and bind arguments.
//! - `configuration`: settings loading and tracing setup.
//! - `database`: the execution engine, transactions and the array codec.

pub use configuration::{self, init_tracing, load_config, load_config_from, settings::Settings};
pub use core_types::{
    self, Args, Base, BindFields, Clock, HardDeleteModel, InsertMode, MockClock, Model, Queries,
    QueryBuilder, SystemClock,
};
pub use database::{
    self, context, Array, ArrayElement, BindType, Db, DbError, DbOptions, Tx,
};

use tracing_appender::non_blocking::WorkerGuard;

/// Loads `sequel.toml` (and `SEQUEL__*` overrides), installs the tracing
/// subscriber and connects.
///
/// Keep the returned guard alive for as long as file logging should flush.
pub async fn bootstrap() -> Result<(Db, Option<WorkerGuard>), DbError> {
    let settings = load_config()?;
    let guard = init_tracing(&settings.logging)?;
    tracing::info!("Configuration loaded.");

    let db = Db::from_settings(&settings.database).await?;
    Ok((db, guard))
}
