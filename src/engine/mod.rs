//! Reasoning engine interface.
//!
//! The protocol layer consumes a compiled rule set only through the
//! [`Engine`] trait. [`crate::gdl::GdlEngine`] is the built-in
//! implementation.

mod interface;
mod params;

pub use interface::{Engine, FactId, LegalMove, StateData};
pub use params::EngineParameters;
