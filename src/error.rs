//! Crate-wide error type.
//!
//! Every fallible operation returns [`Result`]. The variants follow the
//! protocol's error taxonomy: notation errors, rejected moves, calls made in
//! the wrong terminal/non-terminal phase, engine contract violations and
//! engine resource failures. None of them are transient, so nothing in the
//! crate retries.

use thiserror::Error;

/// Errors raised by the notation converter, the Game/State protocol, the
/// portable layer and the reasoning engine.
#[derive(Error, Debug)]
pub enum GdlError {
    /// Malformed notation text.
    #[error("format error: {message} (unparsed: {remainder:?})")]
    Format {
        /// What went wrong.
        message: String,
        /// Input left unparsed at the point of failure.
        remainder: String,
    },

    /// Missing, duplicate, mismatched, foreign or illegal move in `play`.
    /// The state is never mutated when this is returned.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Call made in the wrong terminal/non-terminal phase.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The engine or rule set broke the protocol contract.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// The engine could not acquire a resource.
    #[error("engine failure: {0}")]
    EngineFailure(String),

    /// The rule set was rejected while loading.
    #[error("invalid rules: {0}")]
    InvalidRules(String),

    /// Portable data does not describe anything in the target game.
    #[error("incompatible snapshot: {0}")]
    IncompatibleSnapshot(String),

    /// Reading a rule file or running the pre-translator failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary wire encoding failed.
    #[error("wire encoding error: {0}")]
    Wire(#[from] bincode::Error),
}

impl GdlError {
    /// Build a [`GdlError::Format`] from a message and the unparsed input.
    pub fn format(message: impl Into<String>, remainder: impl Into<String>) -> Self {
        GdlError::Format {
            message: message.into(),
            remainder: remainder.into(),
        }
    }

    /// True for errors that signal a rule-set or engine defect rather than
    /// caller misuse.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, GdlError::InternalInconsistency(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GdlError>;
