//! Engine-instance independent snapshots.
//!
//! Players, moves and states captured from one game can be restored into
//! any other game compiled from byte-identical rule text:
//!
//! ```
//! use gdl_play::{Game, State};
//! use gdl_play::games::TICTACTOE;
//!
//! let a = Game::new(TICTACTOE).unwrap();
//! let b = Game::new(TICTACTOE).unwrap();
//!
//! let mut state = State::new(&a).unwrap();
//! state.playout().unwrap();
//! let snapshot = state.to_portable();
//!
//! let restored = State::from_portable(&b, &snapshot).unwrap();
//! assert!(restored.is_terminal());
//! assert_eq!(restored.goals().unwrap()[0].score, state.goals().unwrap()[0].score);
//! ```

mod player;
mod state;

pub use player::{
    portable_goals, portable_player_moves, to_portable_all, PortableMove, PortablePlayer,
    PortablePlayerGoal, PortablePlayerMove,
};
pub use state::PortableState;
