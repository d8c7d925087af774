//! The Game/State protocol.
//!
//! This module contains the types a caller plays with: games, players,
//! moves, the legal-move collection and the state cursor. Every rule the
//! protocol enforces (one move per role, legality, terminal call order) is
//! checked here, on top of whatever [`Engine`](crate::engine::Engine) the
//! game wraps.

pub mod config;
mod gadelac;
pub mod game;
pub mod moves;
pub mod player;
pub mod player_moves;
pub mod rng;
pub mod state;

pub use config::{GameConfig, GameSource};
pub use game::Game;
pub use moves::{JointMove, Move};
pub use player::{GameId, Player, PlayerGoal};
pub use player_moves::{MovesOf, PlayerMoves};
pub use rng::GameRng;
pub use state::State;
