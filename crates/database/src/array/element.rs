use super::types::ElementKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ipnetwork::IpNetwork;
use rust_decimal::Decimal;
use sqlx::error::BoxDynError;
use sqlx::postgres::PgHasArrayType;
use std::fmt::Write;
use std::str::FromStr;
use uuid::Uuid;

/// A Rust type that can be an element of an [`Array`](super::Array).
pub trait ArrayElement: PgHasArrayType + Sized {
    /// The element kinds this type decodes from.
    const KINDS: &'static [ElementKind];

    /// Parses one element from its text form.
    fn parse_element(s: &str) -> Result<Self, BoxDynError>;

    /// Appends the text form of the element, unquoted.
    fn write_element(&self, out: &mut String);
}

macro_rules! display_element {
    ($ty:ty, [$($kind:ident),+]) => {
        impl ArrayElement for $ty {
            const KINDS: &'static [ElementKind] = &[$(ElementKind::$kind),+];

            fn parse_element(s: &str) -> Result<Self, BoxDynError> {
                Ok(<$ty>::from_str(s)?)
            }

            fn write_element(&self, out: &mut String) {
                let _ = write!(out, "{self}");
            }
        }
    };
}

display_element!(i16, [Int2]);
display_element!(i32, [Int2, Int4]);
display_element!(i64, [Int2, Int4, Int8]);
display_element!(Decimal, [Numeric]);
display_element!(IpNetwork, [Inet, Cidr]);

impl ArrayElement for bool {
    const KINDS: &'static [ElementKind] = &[ElementKind::Bool];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        match s.to_ascii_lowercase().as_str() {
            "t" | "true" | "1" => Ok(true),
            "f" | "false" | "0" => Ok(false),
            _ => Err(format!("invalid boolean {s:?}").into()),
        }
    }

    fn write_element(&self, out: &mut String) {
        out.push(if *self { 't' } else { 'f' });
    }
}

macro_rules! float_element {
    ($ty:ty, [$($kind:ident),+]) => {
        impl ArrayElement for $ty {
            const KINDS: &'static [ElementKind] = &[$(ElementKind::$kind),+];

            fn parse_element(s: &str) -> Result<Self, BoxDynError> {
                Ok(s.parse::<$ty>()?)
            }

            fn write_element(&self, out: &mut String) {
                if self.is_nan() {
                    out.push_str("NaN");
                } else if self.is_infinite() {
                    out.push_str(if self.is_sign_positive() { "Infinity" } else { "-Infinity" });
                } else {
                    let _ = write!(out, "{self}");
                }
            }
        }
    };
}

float_element!(f32, [Float4]);
float_element!(f64, [Float4, Float8]);

impl ArrayElement for String {
    const KINDS: &'static [ElementKind] = &[ElementKind::Text];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        Ok(s.to_owned())
    }

    fn write_element(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl ArrayElement for Uuid {
    const KINDS: &'static [ElementKind] = &[ElementKind::Uuid];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        Ok(Uuid::parse_str(s)?)
    }

    fn write_element(&self, out: &mut String) {
        let _ = write!(out, "{}", self.hyphenated());
    }
}

impl ArrayElement for DateTime<Utc> {
    const KINDS: &'static [ElementKind] = &[ElementKind::Timestamptz];

    // The server prints timestamptz in the session zone, e.g.
    // `2024-01-02 03:04:05.123456+00` or `... +05:30`.
    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        let parsed = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z")
            .or_else(|_| DateTime::parse_from_rfc3339(s))?;
        Ok(parsed.with_timezone(&Utc))
    }

    fn write_element(&self, out: &mut String) {
        let _ = write!(out, "{}", self.format("%Y-%m-%d %H:%M:%S%.6f+00"));
    }
}

impl ArrayElement for NaiveDateTime {
    const KINDS: &'static [ElementKind] = &[ElementKind::Timestamp];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        Ok(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")?)
    }

    fn write_element(&self, out: &mut String) {
        let _ = write!(out, "{}", self.format("%Y-%m-%d %H:%M:%S%.6f"));
    }
}

impl ArrayElement for NaiveDate {
    const KINDS: &'static [ElementKind] = &[ElementKind::Date];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    fn write_element(&self, out: &mut String) {
        let _ = write!(out, "{}", self.format("%Y-%m-%d"));
    }
}

impl ArrayElement for serde_json::Value {
    const KINDS: &'static [ElementKind] = &[ElementKind::Json, ElementKind::Jsonb];

    fn parse_element(s: &str) -> Result<Self, BoxDynError> {
        Ok(serde_json::from_str(s)?)
    }

    fn write_element(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}
