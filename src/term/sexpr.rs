//! Fully parenthesized (S-expression) notation.
//!
//! A term is a bare token or `(` sub-terms `)`. Tokens are maximal runs of
//! characters other than whitespace, `(`, `)` and `|`. The `|` character is
//! reserved for the flat notation's arity suffix and is rejected here.

use crate::error::{GdlError, Result};

use super::tree::Term;

/// Arity delimiter of the flat notation; never valid in S-expressions.
pub(crate) const ARITY_DELIMITER: char = '|';

/// Deepest compound nesting either parser accepts.
pub const MAX_NESTING: usize = 512;

/// Stateless cursor over S-expression text.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos == self.text.len()
    }

    fn error(&self, message: &str) -> GdlError {
        GdlError::format(message, self.rest())
    }

    /// Parse one term starting at the cursor (after optional whitespace).
    fn term(&mut self) -> Result<Term> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected a term but found end of input")),
            Some('(') => self.compound(),
            Some(')') => Err(self.error("unexpected ')'")),
            Some(_) => self.token().map(Term::Atom),
        }
    }

    fn compound(&mut self) -> Result<Term> {
        let start = self.pos;
        if self.depth >= MAX_NESTING {
            return Err(GdlError::format(
                format!("terms nest deeper than {MAX_NESTING} levels"),
                &self.text[start..],
            ));
        }
        self.depth += 1;
        self.pos += 1; // '('
        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(GdlError::format(
                        "unbalanced parentheses: missing ')'",
                        &self.text[start..],
                    ))
                }
                Some(')') => {
                    self.pos += 1;
                    self.depth -= 1;
                    return Ok(Term::Compound(children));
                }
                Some(_) => children.push(self.term()?),
            }
        }
    }

    fn token(&mut self) -> Result<String> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ARITY_DELIMITER)
            .unwrap_or(rest.len());
        if rest[end..].starts_with(ARITY_DELIMITER) {
            self.pos += end;
            return Err(self.error("'|' is not allowed in S-expressions"));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }
}

/// Parse a single S-expression. The whole input must be consumed.
///
/// ```
/// use gdl_play::term::{parse_sexpr, Term};
///
/// let t = parse_sexpr("(legal white (mark 1 1))").unwrap();
/// assert_eq!(t.head(), Some("legal"));
/// assert!(parse_sexpr("(a (b c)").is_err());
/// ```
pub fn parse_sexpr(text: &str) -> Result<Term> {
    let mut cursor = Cursor::new(text);
    let term = cursor.term()?;
    if !cursor.at_end() {
        return Err(cursor.error("trailing input after term"));
    }
    Ok(term)
}

/// Parse a whitespace separated sequence of S-expressions, e.g. a GDL
/// document with comments already removed. Empty input yields no terms.
pub fn parse_sexprs(text: &str) -> Result<Vec<Term>> {
    let mut cursor = Cursor::new(text);
    let mut terms = Vec::new();
    while !cursor.at_end() {
        terms.push(cursor.term()?);
    }
    Ok(terms)
}

/// Render a term as an S-expression with single spaces between children.
#[must_use]
pub fn generate_sexpr(term: &Term) -> String {
    term.to_string()
}

/// Re-render S-expression text in canonical spacing.
pub fn canonical_sexpr(text: &str) -> Result<String> {
    parse_sexpr(text).map(|t| generate_sexpr(&t))
}
