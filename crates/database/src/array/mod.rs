//! One-dimensional PostgreSQL arrays that keep NULL and empty apart.
//!
//! [`Array<T>`] binds and decodes through sqlx. Binary results are decoded
//! by sqlx's own `Vec<T>` codec; text results (`raw_sql`, simple-protocol
//! queries) go through the literal parser in this module, which checks the
//! column's array OID against the element type first.

mod element;
mod literal;
mod types;

pub use element::ArrayElement;
pub use types::{array_type, ArrayType, ElementKind};

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type, ValueRef};
use std::any::type_name;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrayError {
    #[error("no array type descriptor for {0}")]
    NoTypeDescriptor(&'static str),

    #[error("cannot decode an array from a {0} source")]
    UnsupportedSource(&'static str),

    #[error("unknown array type oid {0}")]
    UnknownOid(u32),

    #[error("cannot decode {array} into an array of {target}")]
    TypeMismatch { array: &'static str, target: &'static str },

    #[error("malformed array literal at offset {pos}: {message}")]
    Parse { pos: usize, message: &'static str },

    #[error("invalid array element {index}: {message}")]
    Element { index: usize, message: String },
}

/// Where an array value is scanned from.
#[derive(Debug, Clone, Copy)]
pub enum ArraySource<'a> {
    Null,
    Text(&'a str),
    /// Text format delivered as bytes.
    Bytes(&'a [u8]),
    /// Binary wire format.
    Binary(&'a [u8]),
}

/// An array column value. `None` is SQL NULL, `Some(vec![])` is `'{}'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array<T>(pub Option<Vec<T>>);

impl<T> Default for Array<T> {
    fn default() -> Self {
        Array(None)
    }
}

impl<T> Array<T> {
    pub fn null() -> Self {
        Array(None)
    }

    pub fn new(values: Vec<T>) -> Self {
        Array(Some(values))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// The elements, or `None` for a NULL array.
    pub fn as_slice(&self) -> Option<&[T]> {
        self.0.as_deref()
    }

    /// Number of elements; a NULL array has none.
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().unwrap_or_default().iter()
    }

    pub fn into_inner(self) -> Option<Vec<T>> {
        self.0
    }
}

impl<T: ArrayElement> Array<T> {
    /// The text literal for this value, `None` for NULL.
    pub fn to_literal(&self) -> Option<String> {
        self.as_slice().map(literal::write)
    }

    /// Scans `src` using the array OID that `T` declares.
    pub fn scan(src: ArraySource<'_>) -> Result<Self, ArrayError> {
        let oid = T::array_type_info()
            .oid()
            .map(|oid| oid.0)
            .filter(|oid| array_type(*oid).is_some())
            .ok_or(ArrayError::NoTypeDescriptor(type_name::<T>()))?;
        array_scan(oid, src)
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(values: Vec<T>) -> Self {
        Array(Some(values))
    }
}

impl<T> From<Option<Vec<T>>> for Array<T> {
    fn from(values: Option<Vec<T>>) -> Self {
        Array(values)
    }
}

/// Decodes a text-format array whose column type is `oid`.
///
/// A NULL source is the NULL array. The OID must be a registered array type
/// whose element kind `T` accepts, and every element must be non-NULL and
/// parse as `T`.
pub fn array_scan<T: ArrayElement>(oid: u32, src: ArraySource<'_>) -> Result<Array<T>, ArrayError> {
    let text = match src {
        ArraySource::Null => return Ok(Array::null()),
        ArraySource::Text(s) => s,
        ArraySource::Bytes(b) => std::str::from_utf8(b).map_err(|e| ArrayError::Parse {
            pos: e.valid_up_to(),
            message: "invalid UTF-8",
        })?,
        ArraySource::Binary(_) => return Err(ArrayError::UnsupportedSource("binary")),
    };

    let ty = array_type(oid).ok_or(ArrayError::UnknownOid(oid))?;
    if !T::KINDS.contains(&ty.element) {
        return Err(ArrayError::TypeMismatch {
            array: ty.name,
            target: type_name::<T>(),
        });
    }

    let values = literal::parse(text)?
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.ok_or_else(|| ArrayError::Element {
                index,
                message: "unexpected NULL element".to_string(),
            })?;
            T::parse_element(&raw).map_err(|e| ArrayError::Element {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Array(Some(values)))
}

impl<T: ArrayElement> Type<Postgres> for Array<T> {
    fn type_info() -> PgTypeInfo {
        T::array_type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        T::array_compatible(ty)
    }
}

impl<'q, T> Encode<'q, Postgres> for Array<T>
where
    T: ArrayElement,
    Vec<T>: Encode<'q, Postgres>,
{
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        match &self.0 {
            Some(values) => <Vec<T> as Encode<'q, Postgres>>::encode_by_ref(values, buf),
            None => Ok(IsNull::Yes),
        }
    }
}

impl<'r, T> Decode<'r, Postgres> for Array<T>
where
    T: ArrayElement,
    Vec<T>: Decode<'r, Postgres>,
{
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(Array::null());
        }
        match value.format() {
            PgValueFormat::Binary => Ok(Array(Some(<Vec<T> as Decode<'r, Postgres>>::decode(value)?))),
            PgValueFormat::Text => {
                let oid = value
                    .type_info()
                    .oid()
                    .or_else(|| T::array_type_info().oid())
                    .map(|oid| oid.0)
                    .ok_or(ArrayError::NoTypeDescriptor(type_name::<T>()))?;
                Ok(array_scan(oid, ArraySource::Text(value.as_str()?))?)
            }
        }
    }
}
