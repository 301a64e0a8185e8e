use crate::error::CoreError;
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, Encode, Postgres, Type};
use std::fmt;

/// Positional bind arguments for a single statement.
///
/// Adding a value never fails at the call site. The first encode error is
/// kept and reported by [`Args::into_arguments`], so binding can be chained
/// like `sqlx::query(..).bind(..)`.
#[derive(Default)]
pub struct Args {
    inner: PgArguments,
    count: usize,
    error: Option<BoxDynError>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` as the next positional argument.
    pub fn add<'q, T>(&mut self, value: T)
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres>,
    {
        if self.error.is_some() {
            return;
        }
        match Arguments::add(&mut self.inner, value) {
            Ok(()) => self.count += 1,
            Err(e) => self.error = Some(e),
        }
    }

    /// Builder form of [`Args::add`].
    pub fn with<'q, T>(mut self, value: T) -> Self
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres>,
    {
        self.add(value);
        self
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finalises the buffer, surfacing the first encode error if any.
    pub fn into_arguments(self) -> Result<PgArguments, CoreError> {
        match self.error {
            Some(e) => Err(CoreError::Encode(e)),
            None => Ok(self.inner),
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("len", &self.count)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}
