//! Term model and the two textual notations.
//!
//! - [`Term`]: recursive atom/compound tree
//! - S-expression notation: [`parse_sexpr`], [`generate_sexpr`]
//! - Flat notation: [`parse_flat`], [`generate_flat`]
//! - Converters: [`sexpr_to_flat`], [`flat_to_sexpr`]
//! - GDL clean-up: [`strip_comments`], [`normalize_keywords`]

mod flat;
mod normalize;
mod sexpr;
mod tree;

pub use flat::{flat_to_sexpr, generate_flat, parse_flat, sexpr_to_flat};
pub use normalize::{normalize_keywords, strip_comments};
pub(crate) use normalize::normalize_sentence;
pub use sexpr::{canonical_sexpr, generate_sexpr, parse_sexpr, parse_sexprs, MAX_NESTING};
pub use tree::Term;
