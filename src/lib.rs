//! # gdl-play
//!
//! A Game/State protocol over a General Game Playing reasoning engine.
//!
//! ## Design Principles
//!
//! 1. **Engine-Agnostic**: The protocol drives any [`Engine`]. The built-in
//!    [`GdlEngine`] interprets classic GDL rule sets.
//!
//! 2. **Checked Protocol**: One move per role, legality and the
//!    terminal/non-terminal call order are enforced above the engine.
//!    Rejected calls never mutate a state.
//!
//! 3. **Portable Snapshots**: Players, moves and states can be captured
//!    from one game and restored into another game compiled from the same
//!    rule text.
//!
//! ## Modules
//!
//! - `term`: term tree, S-expression and flat notations
//! - `engine`: reasoning engine trait, fact identities, parameters
//! - `gdl`: built-in GDL interpreter
//! - `core`: games, players, moves, legal-move collection, states
//! - `portable`: engine-instance independent snapshots and wire form
//! - `games`: built-in rule sets
//!
//! ## Example
//!
//! ```
//! use gdl_play::{Game, State};
//! use gdl_play::games::TICTACTOE;
//!
//! let game = Game::new(TICTACTOE).unwrap();
//! let mut state = State::new(&game).unwrap();
//!
//! let legals = state.legals().unwrap();
//! assert_eq!(legals.len(), 10);
//!
//! let goals = state.playout().unwrap();
//! assert_eq!(goals.iter().map(|g| g.score).sum::<u32>(), 100);
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod games;
pub mod gdl;
pub mod portable;
pub mod term;

// Re-export commonly used types
pub use crate::core::{
    Game, GameConfig, GameId, GameRng, GameSource, JointMove, Move, MovesOf, Player, PlayerGoal,
    PlayerMoves, State,
};

pub use crate::engine::{Engine, EngineParameters, FactId, LegalMove, StateData};

pub use crate::error::{GdlError, Result};

pub use crate::gdl::{GdlEngine, GdlState};

pub use crate::portable::{
    PortableMove, PortablePlayer, PortablePlayerGoal, PortablePlayerMove, PortableState,
};

pub use crate::term::{
    flat_to_sexpr, generate_flat, generate_sexpr, parse_flat, parse_sexpr, sexpr_to_flat, Term,
};
