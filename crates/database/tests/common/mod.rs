//! Shared fixtures for the tests that need a live PostgreSQL.
//!
//! Point `DATABASE_URL` (or a `.env` file) at a scratch database; without it
//! every test returns early.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use core_types::{Args, Base, BindFields, CoreError, HardDeleteModel, InsertMode, Model};
use database::{Db, DbOptions};
use sqlx::FromRow;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS person_test (
    id         TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    deleted_at TIMESTAMPTZ,
    name       TEXT NOT NULL,
    email      TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS person_test_email_idx ON person_test (email);

CREATE TABLE IF NOT EXISTS token_test (
    id         TEXT PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    deleted_at TIMESTAMPTZ,
    label      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS deferred_test (
    code TEXT NOT NULL,
    CONSTRAINT deferred_test_code_key UNIQUE (code) DEFERRABLE INITIALLY DEFERRED
);

CREATE TABLE IF NOT EXISTS array_test (
    id     TEXT PRIMARY KEY,
    tags   TEXT[],
    scores BIGINT[],
    prices NUMERIC[],
    seen   TIMESTAMPTZ[]
);

CREATE TABLE IF NOT EXISTS inet_test (
    id    TEXT PRIMARY KEY,
    addrs INET[]
);
"#;

/// Connects with default options, or returns `None` when no database is configured.
pub async fn setup() -> Option<Db> {
    setup_with(DbOptions::default()).await
}

pub async fn setup_with(opts: DbOptions) -> Option<Db> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping");
        return None;
    };

    let db = Db::connect(&url, opts).await.expect("failed to connect to DATABASE_URL");
    create_schema(&db).await;
    Some(db)
}

// Concurrent test binaries race on CREATE TABLE IF NOT EXISTS; the advisory
// lock serialises them.
async fn create_schema(db: &Db) {
    let mut tx = db.pool().begin().await.expect("begin schema transaction");
    sqlx::query("SELECT pg_advisory_xact_lock(727274)")
        .execute(&mut *tx)
        .await
        .expect("take schema lock");
    sqlx::raw_sql(SCHEMA).execute(&mut *tx).await.expect("create schema");
    tx.commit().await.expect("commit schema");
}

/// A unique value for columns under a unique index.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

pub async fn count_named(db: &Db, name: &str) -> i64 {
    db.get::<(i64,)>(
        "SELECT COUNT(*) FROM person_test WHERE name = $1",
        Args::new().with(name.to_string()),
    )
    .await
    .expect("count rows")
    .0
}

pub const PERSON_SELECT: &str = "SELECT id, created_at, updated_at, deleted_at, name, email \
     FROM person_test WHERE id = $1 AND deleted_at IS NULL";
pub const PERSON_INSERT: &str = "INSERT INTO person_test (created_at, updated_at, name, email) \
     VALUES (:created_at, :updated_at, :name, :email) RETURNING id";
pub const PERSON_UPDATE: &str = "UPDATE person_test SET updated_at = :updated_at, name = :name, email = :email \
     WHERE id = :id AND deleted_at IS NULL";
pub const PERSON_DELETE: &str =
    "UPDATE person_test SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL";
pub const PERSON_HARD_DELETE: &str = "DELETE FROM person_test WHERE id = $1";

pub const LEGACY_SELECT: &str = "SELECT id, created_at, updated_at, deleted_at, name, email \
     FROM person_test WHERE id = ? AND deleted_at IS NULL";
pub const LEGACY_DELETE: &str =
    "UPDATE person_test SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL";
pub const LEGACY_HARD_DELETE: &str = "DELETE FROM person_test WHERE id = ?";

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Person {
    #[sqlx(flatten)]
    pub base: Base,
    pub name: String,
    pub email: Option<String>,
    /// Use the `?` templates, for engines built with model rebinding.
    #[sqlx(skip)]
    pub legacy: bool,
}

impl Person {
    pub fn new(name: &str, email: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            email,
            ..Self::default()
        }
    }

    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }
}

impl BindFields for Person {
    fn bind_field(&self, name: &str, args: &mut Args) -> Result<(), CoreError> {
        match name {
            "name" => args.add(self.name.clone()),
            "email" => args.add(self.email.clone()),
            _ => return self.base.bind_field(name, args),
        }
        Ok(())
    }
}

impl Model for Person {
    fn id(&self) -> &str {
        self.base.id()
    }
    fn set_id(&mut self, id: String) {
        self.base.set_id(id);
    }
    fn set_created_at(&mut self, t: DateTime<Utc>) {
        self.base.set_created_at(t);
    }
    fn set_updated_at(&mut self, t: DateTime<Utc>) {
        self.base.set_updated_at(t);
    }
    fn set_deleted_at(&mut self, t: Option<DateTime<Utc>>) {
        self.base.set_deleted_at(t);
    }
    fn select_query(&self) -> &str {
        if self.legacy { LEGACY_SELECT } else { PERSON_SELECT }
    }
    fn insert_query(&self) -> &str {
        PERSON_INSERT
    }
    fn update_query(&self) -> &str {
        PERSON_UPDATE
    }
    fn delete_query(&self) -> &str {
        if self.legacy { LEGACY_DELETE } else { PERSON_DELETE }
    }
}

impl HardDeleteModel for Person {
    fn hard_delete_query(&self) -> &str {
        if self.legacy { LEGACY_HARD_DELETE } else { PERSON_HARD_DELETE }
    }
}

/// A model whose id is chosen by the caller.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Token {
    #[sqlx(flatten)]
    pub base: Base,
    pub label: String,
}

impl Token {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            base: Base::with_id(id),
            label: label.to_string(),
        }
    }
}

impl BindFields for Token {
    fn bind_field(&self, name: &str, args: &mut Args) -> Result<(), CoreError> {
        match name {
            "label" => args.add(self.label.clone()),
            _ => return self.base.bind_field(name, args),
        }
        Ok(())
    }
}

impl Model for Token {
    fn id(&self) -> &str {
        self.base.id()
    }
    fn set_id(&mut self, id: String) {
        self.base.set_id(id);
    }
    fn set_created_at(&mut self, t: DateTime<Utc>) {
        self.base.set_created_at(t);
    }
    fn set_updated_at(&mut self, t: DateTime<Utc>) {
        self.base.set_updated_at(t);
    }
    fn set_deleted_at(&mut self, t: Option<DateTime<Utc>>) {
        self.base.set_deleted_at(t);
    }
    fn select_query(&self) -> &str {
        "SELECT id, created_at, updated_at, deleted_at, label FROM token_test WHERE id = $1"
    }
    fn insert_query(&self) -> &str {
        "INSERT INTO token_test (id, created_at, updated_at, label) VALUES (:id, :created_at, :updated_at, :label)"
    }
    fn update_query(&self) -> &str {
        "UPDATE token_test SET updated_at = :updated_at, label = :label WHERE id = :id"
    }
    fn delete_query(&self) -> &str {
        "UPDATE token_test SET deleted_at = $1 WHERE id = $2"
    }
    fn insert_mode(&self) -> InsertMode {
        InsertMode::Exec
    }
}
