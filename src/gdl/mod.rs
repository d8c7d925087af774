//! Built-in GDL reasoning engine.
//!
//! A forward-chaining interpreter for the classic GDL subset: facts, rules
//! with `not`, `distinct`, `or` and `and`, stratified negation and the
//! `role`/`init`/`true`/`does`/`next`/`legal`/`goal`/`terminal` relations.
//!
//! ## Compilation
//!
//! 1. Strip comments and normalise keyword case
//! 2. Load sentences into rules and check safety
//! 3. Stratify and split rules into static, state and move groups
//! 4. Compute the reachable fluent and move domain and number it

mod domain;
mod engine;
mod eval;
mod rules;

pub use engine::{GdlEngine, GdlState};
