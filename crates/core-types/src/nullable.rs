//! Zero-value-means-NULL helpers for optional columns.

/// Returns `None` for the type's zero value, `Some(v)` otherwise.
///
/// ```
/// use core_types::nullable::null_if_zero;
///
/// assert_eq!(null_if_zero(0_i64), None);
/// assert_eq!(null_if_zero(7_i64), Some(7));
/// ```
pub fn null_if_zero<T: Default + PartialEq>(v: T) -> Option<T> {
    if v == T::default() { None } else { Some(v) }
}

/// Returns `None` for an empty string.
pub fn null_str(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}
