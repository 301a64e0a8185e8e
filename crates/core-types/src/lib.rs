//! # Sequel Core Types
//!
//! Layer 0 of the workspace: the contracts every other crate builds on. It
//! has no knowledge of connections or pools.
//!
//! - `Clock`: the time source used to stamp models, with a frozen
//!   `MockClock` for tests.
//! - `Model` / `HardDeleteModel`: the interface a persisted entity
//!   implements, plus the reusable `Base` columns.
//! - `Args`: positional bind arguments with deferred encode errors.

pub mod args;
pub mod clock;
pub mod enums;
pub mod error;
pub mod model;
pub mod nullable;

// Re-export the core types to provide a clean public API.
pub use args::Args;
pub use clock::{Clock, MockClock, SystemClock};
pub use enums::InsertMode;
pub use error::CoreError;
pub use model::{Base, BindFields, HardDeleteModel, Model, Queries, QueryBuilder};
