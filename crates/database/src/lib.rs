//! # Sequel Database Crate
//!
//! The execution engine: it runs the entity contract from `core-types`
//! against PostgreSQL through a pooled `sqlx` connection.
//!
//! ## Architectural Principles
//!
//! - **One code path:** every statement and model operation is written once
//!   against a generic executor and shared by `Db` (the pool) and `Tx` (one
//!   transaction's connection).
//! - **Engine-owned timestamps:** models are stamped from the configured
//!   `Clock`, never by callers.
//! - **Verified writes:** updates and deletes must affect exactly one row;
//!   zero rows is `DbError::NotFound`.
//!
//! ## Public API
//!
//! - `Db` / `Tx`: the pooled handle and the transaction handle.
//! - `DbOptions`, `connect_from_env`: construction.
//! - `Array`: NULL-preserving array columns.
//! - `rebind`, `compile_named`: placeholder translation.
//! - `context`: deadlines and the request-scoped handle.
//! - `DbError`: the error type returned by every operation.

pub mod array;
pub mod connection;
pub mod context;
pub mod db;
pub mod error;
pub mod named;
mod ops;
pub mod rebind;
pub mod rows;
pub mod tx;

// Re-export the key components to create a clean, public-facing API.
pub use array::{array_scan, Array, ArrayElement, ArrayError, ArraySource};
pub use connection::{connect_from_env, DbOptions, DEFAULT_ACQUIRE_TIMEOUT, MAX_OPEN_CONNECTIONS};
pub use db::Db;
pub use error::{DbError, UNIQUE_VIOLATION};
pub use named::{bind_named, compile_named};
pub use rebind::{rebind, BindType};
pub use rows::{check_rows, rows_affected};
pub use tx::Tx;
