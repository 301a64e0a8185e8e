use crate::args::Args;
use crate::enums::InsertMode;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Resolves the `:name` parameters of a named template to field values.
pub trait BindFields {
    /// Appends the value for `name` to `args`, or fails with
    /// [`CoreError::UnknownField`] if the name is not a field of `self`.
    fn bind_field(&self, name: &str, args: &mut Args) -> Result<(), CoreError>;
}

/// The interface implemented by every persisted model.
///
/// The engine owns the timestamps: callers never stamp `created_at`,
/// `updated_at` or `deleted_at` themselves. The query accessors return the
/// templates registered for the model's type, they do not depend on the
/// instance's field values.
pub trait Model: BindFields + Send + Sync {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn set_created_at(&mut self, t: DateTime<Utc>);
    fn set_updated_at(&mut self, t: DateTime<Utc>);
    /// `None` clears the soft-delete marker, `Some` sets it.
    fn set_deleted_at(&mut self, t: Option<DateTime<Utc>>);

    /// Select by id, `$1` (or `?` with model rebinding) is the id.
    fn select_query(&self) -> &str;
    /// Named insert.
    fn insert_query(&self) -> &str;
    /// Named update.
    fn update_query(&self) -> &str;
    /// Soft delete, bound with `(deleted_at, id)`.
    fn delete_query(&self) -> &str;

    /// Models whose ids are assigned by the caller return [`InsertMode::Exec`].
    fn insert_mode(&self) -> InsertMode {
        InsertMode::Returning
    }
}

/// A model that can be physically removed.
pub trait HardDeleteModel: Model {
    /// Hard delete, bound with `(id)`.
    fn hard_delete_query(&self) -> &str;
}

/// The columns shared by every model. Embed it with `#[sqlx(flatten)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Base {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Base {
    /// A base with a caller-assigned id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub fn set_created_at(&mut self, t: DateTime<Utc>) {
        self.created_at = t;
    }

    pub fn set_updated_at(&mut self, t: DateTime<Utc>) {
        self.updated_at = t;
    }

    pub fn set_deleted_at(&mut self, t: Option<DateTime<Utc>>) {
        self.deleted_at = t;
    }
}

impl BindFields for Base {
    fn bind_field(&self, name: &str, args: &mut Args) -> Result<(), CoreError> {
        match name {
            "id" => args.add(&self.id),
            "created_at" => args.add(self.created_at),
            "updated_at" => args.add(self.updated_at),
            "deleted_at" => args.add(self.deleted_at),
            _ => return Err(CoreError::unknown_field::<Self>(name)),
        }
        Ok(())
    }
}

/// The query builder collaborator: produces the SQL templates for one
/// model type.
pub trait QueryBuilder {
    /// `SELECT .. WHERE id = $1`
    fn select(&self) -> String;
    /// Positional insert of every column, id included.
    fn insert(&self) -> String;
    /// Named insert of every column, id included.
    fn named_insert(&self) -> String;
    /// Named insert without the id column, `RETURNING id`.
    fn named_insert_with_returning(&self) -> String;
    /// Named update by id.
    fn named_update(&self) -> String;
    /// `UPDATE .. SET deleted_at = $1 WHERE id = $2`
    fn delete(&self) -> String;
    /// `DELETE .. WHERE id = $1`
    fn hard_delete(&self) -> String;
}

/// The templates registered for a model type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queries {
    pub select: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub hard_delete: String,
    /// Named insert for models using [`InsertMode::Exec`].
    pub insert_exec: String,
    /// Positional insert, for ad-hoc `exec` calls.
    pub insert_positional: String,
}

impl Queries {
    /// Collects the templates of a builder. `insert` is the variant that
    /// returns the generated id.
    pub fn from_builder<B: QueryBuilder + ?Sized>(builder: &B) -> Self {
        Self {
            select: builder.select(),
            insert: builder.named_insert_with_returning(),
            update: builder.named_update(),
            delete: builder.delete(),
            hard_delete: builder.hard_delete(),
            insert_exec: builder.named_insert(),
            insert_positional: builder.insert(),
        }
    }
}
