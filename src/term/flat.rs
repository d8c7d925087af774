//! Compact arity-annotated (flat) notation.
//!
//! A flat term is `label` (arity 0) or `label|N sub_1 ... sub_N`, where each
//! sub-term is itself flat. `(aa (ab ac) ad)` is written `aa|2 ab|1 ac ad`.
//!
//! Flat notation can only express compounds whose head is an atom, so
//! `((a b) c)` and `()` have no flat form, and the one-element compound
//! `(x)` collapses to the atom `x`.

use crate::error::{GdlError, Result};

use super::sexpr::{generate_sexpr, parse_sexpr, ARITY_DELIMITER, MAX_NESTING};
use super::tree::Term;

/// A whitespace separated token and where it starts.
struct Token<'a> {
    text: &'a str,
    offset: usize,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(Token { text: &text[s..i], offset: s });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token { text: &text[s..], offset: s });
    }
    tokens
}

struct FlatParser<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    next: usize,
}

impl<'a> FlatParser<'a> {
    fn remainder(&self) -> &'a str {
        self.tokens
            .get(self.next)
            .map_or("", |t| &self.text[t.offset..])
    }

    fn term(&mut self, depth: usize) -> Result<Term> {
        let Some(token) = self.tokens.get(self.next) else {
            return Err(GdlError::format(
                "expected a sub-term but found end of input",
                "",
            ));
        };
        let remainder = &self.text[token.offset..];
        if token.text.contains(['(', ')']) {
            return Err(GdlError::format(
                "parentheses are not allowed in flat notation",
                remainder,
            ));
        }

        let (label, arity) = match token.text.split_once(ARITY_DELIMITER) {
            None => (token.text, 0),
            Some((label, suffix)) => {
                let arity = suffix.parse::<usize>().map_err(|_| {
                    GdlError::format(
                        format!("arity suffix {suffix:?} is not a non-negative integer"),
                        remainder,
                    )
                })?;
                (label, arity)
            }
        };
        if label.is_empty() {
            return Err(GdlError::format("empty label", remainder));
        }
        self.next += 1;

        if arity == 0 {
            return Ok(Term::atom(label));
        }
        // every sub-term takes at least one token
        if arity > self.tokens.len() - self.next {
            return Err(GdlError::format(
                format!("{label}|{arity} is missing sub-terms"),
                remainder,
            ));
        }
        if depth >= MAX_NESTING {
            return Err(GdlError::format(
                format!("terms nest deeper than {MAX_NESTING} levels"),
                remainder,
            ));
        }
        let mut children = Vec::with_capacity(arity + 1);
        children.push(Term::atom(label));
        for _ in 0..arity {
            if self.next >= self.tokens.len() {
                return Err(GdlError::format(
                    format!("{label}|{arity} is missing sub-terms"),
                    remainder,
                ));
            }
            children.push(self.term(depth + 1)?);
        }
        Ok(Term::Compound(children))
    }
}

/// Parse flat notation. Exactly the declared number of sub-terms is
/// consumed per label, and nothing may follow the outermost term.
///
/// ```
/// use gdl_play::term::{generate_sexpr, parse_flat};
///
/// let t = parse_flat("aa|2 ab|1 ac ad").unwrap();
/// assert_eq!(generate_sexpr(&t), "(aa (ab ac) ad)");
/// ```
pub fn parse_flat(text: &str) -> Result<Term> {
    let mut parser = FlatParser {
        text,
        tokens: tokenize(text),
        next: 0,
    };
    if parser.tokens.is_empty() {
        return Err(GdlError::format("empty input", text));
    }
    let term = parser.term(0)?;
    if parser.next < parser.tokens.len() {
        return Err(GdlError::format(
            "trailing tokens after term",
            parser.remainder(),
        ));
    }
    Ok(term)
}

/// Render a term in flat notation.
///
/// Fails for compounds that flat notation cannot express: an empty compound
/// or one whose first child is not an atom.
pub fn generate_flat(term: &Term) -> Result<String> {
    let mut out = String::new();
    write_flat(term, &mut out)?;
    Ok(out)
}

fn write_flat(term: &Term, out: &mut String) -> Result<()> {
    if !out.is_empty() {
        out.push(' ');
    }
    match term {
        Term::Atom(label) => {
            if label.contains(ARITY_DELIMITER) {
                return Err(GdlError::format(
                    "label contains the arity delimiter",
                    label.as_str(),
                ));
            }
            out.push_str(label);
        }
        Term::Compound(children) => {
            let Some((head, args)) = children.split_first() else {
                return Err(GdlError::format(
                    "empty compound has no flat form",
                    generate_sexpr(term),
                ));
            };
            let Some(label) = head.as_atom() else {
                return Err(GdlError::format(
                    "compound with a non-atomic head has no flat form",
                    generate_sexpr(term),
                ));
            };
            out.push_str(label);
            if !args.is_empty() {
                out.push(ARITY_DELIMITER);
                out.push_str(&args.len().to_string());
            }
            for arg in args {
                write_flat(arg, out)?;
            }
        }
    }
    Ok(())
}

/// Convert S-expression text to flat notation.
///
/// ```
/// use gdl_play::term::sexpr_to_flat;
///
/// assert_eq!(sexpr_to_flat("(aa ab)").unwrap(), "aa|1 ab");
/// assert!(sexpr_to_flat("((a b) c)").is_err());
/// ```
pub fn sexpr_to_flat(text: &str) -> Result<String> {
    generate_flat(&parse_sexpr(text)?)
}

/// Convert flat notation to S-expression text.
pub fn flat_to_sexpr(text: &str) -> Result<String> {
    Ok(generate_sexpr(&parse_flat(text)?))
}
