//! Translation of the portable `?` placeholder into the driver's bind syntax.

use std::fmt::Write;

/// The placeholder syntax a driver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindType {
    /// `?`
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:arg1`, `:arg2`, ...
    Named,
    /// `@p1`, `@p2`, ...
    At,
}

impl BindType {
    /// Returns the bind type used by the driver with the given name.
    /// Unknown drivers fall back to [`BindType::Question`].
    pub fn for_driver(driver: &str) -> Self {
        match driver {
            "postgres" | "postgresql" | "pgx" | "pgx/v4" | "pgx/v5" | "pq" | "pq-timeouts"
            | "cloudsqlpostgres" | "cockroach" | "nrpostgres" => BindType::Dollar,
            "mysql" | "sqlite" | "sqlite3" | "nrmysql" | "nrsqlite3" => BindType::Question,
            "oracle" | "oci8" | "ora" | "goracle" | "godror" => BindType::Named,
            "sqlserver" | "azuresql" => BindType::At,
            _ => BindType::Question,
        }
    }

    /// Writes the `n`-th (1-based) marker. `name` is only used by
    /// [`BindType::Named`].
    pub(crate) fn write_marker(self, out: &mut String, n: usize, name: Option<&str>) {
        // Writing to a String cannot fail.
        let _ = match self {
            BindType::Question => write!(out, "?"),
            BindType::Dollar => write!(out, "${n}"),
            BindType::Named => match name {
                Some(name) => write!(out, ":{name}"),
                None => write!(out, ":arg{n}"),
            },
            BindType::At => write!(out, "@p{n}"),
        };
    }
}

/// Rewrites every `?` in `query` into the `bind` syntax, numbering them from
/// left to right.
///
/// `??` is an escaped, literal `?` (the jsonb `?` operators) for every bind
/// type, [`BindType::Question`] included. Text inside single-quoted literals
/// is left untouched.
///
/// ```
/// use database::rebind::{rebind, BindType};
///
/// assert_eq!(
///     rebind(BindType::Dollar, "SELECT * FROM person_test WHERE name = ? AND email = ?"),
///     "SELECT * FROM person_test WHERE name = $1 AND email = $2",
/// );
/// ```
pub fn rebind(bind: BindType, query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 8);
    let mut n = 0;
    let mut in_literal = false;
    let mut chars = query.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                if chars.peek() == Some(&'?') {
                    chars.next();
                    out.push('?');
                } else {
                    n += 1;
                    bind.write_marker(&mut out, n, None);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
