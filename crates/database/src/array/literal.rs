//! The PostgreSQL array literal grammar (`{a,"b c",NULL}`), one dimension only.

use super::{ArrayElement, ArrayError};

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: char, message: &'static str) -> Result<(), ArrayError> {
        if self.eat(want) { Ok(()) } else { Err(self.error(message)) }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, message: &'static str) -> ArrayError {
        ArrayError::Parse { pos: self.pos, message }
    }

    /// `[l:u]=`; more than one bound pair means more than one dimension.
    fn dimensions(&mut self) -> Result<(), ArrayError> {
        let mut dims = 0;
        while self.eat('[') {
            let rest = &self.src[self.pos..];
            let close = rest.find(']').ok_or_else(|| self.error("unterminated dimension decoration"))?;
            let valid = rest[..close].split_once(':').is_some_and(|(lower, upper)| {
                lower.trim().parse::<i32>().is_ok() && upper.trim().parse::<i32>().is_ok()
            });
            if !valid {
                return Err(self.error("malformed dimension decoration"));
            }
            self.pos += close + 1;
            dims += 1;
        }
        if dims > 1 {
            return Err(self.error("multi-dimensional arrays are not supported"));
        }
        self.skip_ws();
        self.expect('=', "expected '=' after dimension decoration")?;
        self.skip_ws();
        Ok(())
    }

    fn quoted(&mut self) -> Result<String, ArrayError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated quoted element")),
            }
        }
    }

    fn unquoted(&mut self) -> Result<Option<String>, ArrayError> {
        let mut out = String::new();
        let mut keep = 0;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            match c {
                ',' | '}' => break,
                '{' | '"' => return Err(self.error("unexpected character in element")),
                '\\' => {
                    self.bump();
                    let c = self.bump().ok_or_else(|| self.error("unterminated escape"))?;
                    out.push(c);
                    keep = out.len();
                    escaped = true;
                }
                c => {
                    self.bump();
                    out.push(c);
                    if !c.is_whitespace() {
                        keep = out.len();
                    }
                }
            }
        }
        out.truncate(keep);
        if out.is_empty() {
            return Err(self.error("empty element"));
        }
        if !escaped && out.eq_ignore_ascii_case("NULL") {
            return Ok(None);
        }
        Ok(Some(out))
    }
}

/// Splits a literal into its raw elements. `None` is a `NULL` element.
pub(crate) fn parse(src: &str) -> Result<Vec<Option<String>>, ArrayError> {
    let mut p = Parser { src, pos: 0 };
    p.skip_ws();
    if p.peek() == Some('[') {
        p.dimensions()?;
    }
    p.expect('{', "expected '{'")?;

    let mut elements = Vec::new();
    p.skip_ws();
    if !p.eat('}') {
        loop {
            p.skip_ws();
            match p.peek() {
                Some('{') => return Err(p.error("multi-dimensional arrays are not supported")),
                Some('"') => elements.push(Some(p.quoted()?)),
                Some(_) => elements.push(p.unquoted()?),
                None => return Err(p.error("unexpected end of input")),
            }
            p.skip_ws();
            match p.bump() {
                Some(',') => {}
                Some('}') => break,
                _ => return Err(p.error("expected ',' or '}'")),
            }
        }
    }

    p.skip_ws();
    if p.peek().is_some() {
        return Err(p.error("trailing characters after array"));
    }
    Ok(elements)
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("NULL")
        || s.chars().any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"' | ',' | '\\'))
}

/// Renders `values` as an array literal, quoting elements where the
/// grammar requires it.
pub(crate) fn write<T: ArrayElement>(values: &[T]) -> String {
    let mut out = String::from("{");
    let mut element = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        element.clear();
        value.write_element(&mut element);
        if needs_quotes(&element) {
            out.push('"');
            for c in element.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(&element);
        }
    }
    out.push('}');
    out
}
