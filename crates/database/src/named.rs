//! Compilation of `:name` templates into positional statements.

use crate::error::DbError;
use crate::rebind::BindType;
use core_types::{Args, BindFields};
use sqlx::postgres::PgArguments;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Replaces every `:name` marker with the `bind` syntax and returns the
/// names in the order they appear. A name used twice is bound twice.
///
/// `::` casts, a `:` not followed by a name, and single-quoted literals are
/// copied verbatim.
pub fn compile_named(bind: BindType, query: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(query.len());
    let mut names: Vec<String> = Vec::new();
    let mut in_literal = false;
    let mut chars = query.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            in_literal = !in_literal;
            out.push(c);
            continue;
        }
        if in_literal || c != ':' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some((_, ':')) => {
                chars.next();
                out.push_str("::");
            }
            Some((_, next)) if is_name_char(next) && next != '.' => {
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, n)) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    end = j + n.len_utf8();
                    chars.next();
                }
                let name = &query[start..end];
                names.push(name.to_string());
                bind.write_marker(&mut out, names.len(), Some(name));
            }
            _ => out.push(':'),
        }
    }

    (out, names)
}

/// Compiles `query` and binds every named parameter from `source`.
pub fn bind_named<A>(bind: BindType, query: &str, source: &A) -> Result<(String, PgArguments), DbError>
where
    A: BindFields + ?Sized,
{
    let (sql, names) = compile_named(bind, query);
    let mut args = Args::new();
    for name in &names {
        source.bind_field(name, &mut args)?;
    }
    Ok((sql, args.into_arguments()?))
}
