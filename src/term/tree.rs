//! The recursive term tree shared by both notations.
//!
//! A [`Term`] is either an atomic label or a compound node with an ordered
//! list of children. In GDL the first child of a compound is normally the
//! relation or function name, e.g. `(cell 1 1 b)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A term: an atom or a compound with ordered children.
///
/// Equality, ordering and hashing are structural.
///
/// ```
/// use gdl_play::term::Term;
///
/// let t = Term::compound(vec![Term::atom("mark"), Term::atom("1"), Term::atom("2")]);
/// assert_eq!(t.to_string(), "(mark 1 2)");
/// assert_eq!(t.head(), Some("mark"));
/// assert_eq!(t.arity(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// An opaque token.
    Atom(String),
    /// A parenthesized list of sub-terms.
    Compound(Vec<Term>),
}

impl Term {
    /// Create an atom.
    pub fn atom(label: impl Into<String>) -> Self {
        Term::Atom(label.into())
    }

    /// Create a compound from its children.
    #[must_use]
    pub fn compound(children: Vec<Term>) -> Self {
        Term::Compound(children)
    }

    /// Create a compound `(head args...)` with an atomic head.
    pub fn relation(head: impl Into<String>, args: impl IntoIterator<Item = Term>) -> Self {
        let mut children = vec![Term::atom(head)];
        children.extend(args);
        Term::Compound(children)
    }

    /// Is this an atom?
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self, Term::Atom(_))
    }

    /// The label of an atom.
    #[must_use]
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(label) => Some(label),
            Term::Compound(_) => None,
        }
    }

    /// Children of a compound; empty for atoms.
    #[must_use]
    pub fn children(&self) -> &[Term] {
        match self {
            Term::Atom(_) => &[],
            Term::Compound(children) => children,
        }
    }

    /// Relation/function name: the atom itself, or the atomic first child
    /// of a compound.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        match self {
            Term::Atom(label) => Some(label),
            Term::Compound(children) => children.first().and_then(Term::as_atom),
        }
    }

    /// Number of arguments after the head. Atoms and empty compounds have
    /// arity 0.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Term::Atom(_) => 0,
            Term::Compound(children) => children.len().saturating_sub(1),
        }
    }

    /// Arguments after the head.
    #[must_use]
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Atom(_) => &[],
            Term::Compound(children) if children.is_empty() => &[],
            Term::Compound(children) => &children[1..],
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Term::Atom(_) => 1,
            Term::Compound(children) => 1 + children.iter().map(Term::size).sum::<usize>(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(label) => f.write_str(label),
            Term::Compound(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl std::str::FromStr for Term {
    type Err = crate::error::GdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::sexpr::parse_sexpr(s)
    }
}

impl From<&str> for Term {
    fn from(label: &str) -> Self {
        Term::atom(label)
    }
}
