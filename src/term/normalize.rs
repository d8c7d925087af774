//! GDL source clean-up: comment stripping and keyword normalisation.
//!
//! Many published rule sets (e.g. the Dresden archive) are written in upper
//! case. Only the GDL keywords are case-sensitive for the reasoner, so they
//! are lowered where they occur as a relation of the right arity; every
//! other token keeps its case.

use crate::error::Result;

use super::sexpr::parse_sexprs;
use super::tree::Term;

/// Arity constraint of a keyword.
#[derive(Clone, Copy, Debug)]
enum KeywordArity {
    Exactly(usize),
    AtLeastOne,
}

/// GDL keywords and the arity at which they are keywords.
const KEYWORDS: &[(&str, KeywordArity)] = &[
    ("role", KeywordArity::Exactly(1)),
    ("terminal", KeywordArity::Exactly(0)),
    ("does", KeywordArity::Exactly(2)),
    ("input", KeywordArity::Exactly(2)),
    ("legal", KeywordArity::Exactly(2)),
    ("goal", KeywordArity::Exactly(2)),
    ("sees", KeywordArity::Exactly(2)),
    ("distinct", KeywordArity::Exactly(2)),
    ("init", KeywordArity::Exactly(1)),
    ("true", KeywordArity::Exactly(1)),
    ("next", KeywordArity::Exactly(1)),
    ("base", KeywordArity::Exactly(1)),
    ("not", KeywordArity::Exactly(1)),
    ("and", KeywordArity::AtLeastOne),
    ("or", KeywordArity::AtLeastOne),
];

fn keyword(label: &str, arity: usize) -> Option<&'static str> {
    let lower = label.to_ascii_lowercase();
    KEYWORDS.iter().find_map(|(name, expected)| {
        let fits = match expected {
            KeywordArity::Exactly(n) => *n == arity,
            KeywordArity::AtLeastOne => arity >= 1,
        };
        (*name == lower && fits).then_some(*name)
    })
}

/// Remove `;` comments up to the end of each line.
///
/// ```
/// use gdl_play::term::strip_comments;
///
/// assert_eq!(strip_comments("(role x) ; first\n(role y)"), "(role x) \n(role y)");
/// ```
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.split_once(';').map_or(line, |(code, _)| code));
    }
    out
}

/// Strip comments and lower-case GDL keywords in relation position.
///
/// The output is the parsed sentences re-rendered and joined by single
/// spaces.
pub fn normalize_keywords(text: &str) -> Result<String> {
    let sentences = parse_sexprs(&strip_comments(text))?;
    Ok(sentences
        .iter()
        .map(|s| normalize_sentence(s).to_string())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Normalise a top-level sentence: a fact or a `(<= head body...)` rule.
pub(crate) fn normalize_sentence(sentence: &Term) -> Term {
    match sentence {
        Term::Compound(children) if sentence.head() == Some("<=") => {
            let mut out = Vec::with_capacity(children.len());
            out.push(children[0].clone());
            out.extend(children[1..].iter().map(normalize_relation));
            Term::Compound(out)
        }
        _ => normalize_relation(sentence),
    }
}

fn normalize_relation(term: &Term) -> Term {
    match term {
        Term::Atom(label) => match keyword(label, 0) {
            Some(k) => Term::atom(k),
            None => term.clone(),
        },
        Term::Compound(children) => {
            let Some(label) = term.head() else {
                return term.clone();
            };
            let Some(k) = keyword(label, term.arity()) else {
                return term.clone();
            };
            let args = &children[1..];
            let args: Vec<Term> = match k {
                "not" | "and" | "or" => args.iter().map(normalize_relation).collect(),
                _ => args.to_vec(),
            };
            Term::relation(k, args)
        }
    }
}
