//! Portable players, moves and goals.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::core::{Game, JointMove, Move, Player, PlayerGoal, PlayerMoves};
use crate::engine::{Engine, FactId};
use crate::error::{GdlError, Result};

/// A player reduced to its role index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortablePlayer {
    /// Role index.
    pub role: usize,
}

impl From<&Player> for PortablePlayer {
    fn from(player: &Player) -> Self {
        Self {
            role: player.role(),
        }
    }
}

/// A move reduced to its role, its canonical text and the engine identity
/// it had when captured.
///
/// The text is what restores the move. The identity is a hint that only
/// means something to games compiled from the same rules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortableMove {
    /// Role index of the mover.
    pub role: usize,
    /// Canonical S-expression text.
    pub text: String,
    /// Relation table index at capture time.
    pub relation: u32,
    /// Tuple index at capture time.
    pub tuple: u32,
}

impl From<&Move> for PortableMove {
    fn from(mv: &Move) -> Self {
        let fact = mv.fact();
        Self {
            role: mv.role(),
            text: mv.text().to_string(),
            relation: fact.relation,
            tuple: fact.tuple,
        }
    }
}

impl fmt::Display for PortableMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Portable (player, move) pair.
pub type PortablePlayerMove = (PortablePlayer, PortableMove);

/// Portable (player, score) pair.
pub type PortablePlayerGoal = (PortablePlayer, u32);

/// Convert a batch of values into their portable form.
///
/// ```
/// use gdl_play::Game;
/// use gdl_play::games::TICTACTOE;
/// use gdl_play::portable::{to_portable_all, PortablePlayer};
///
/// let game = Game::new(TICTACTOE).unwrap();
/// let players: Vec<PortablePlayer> = to_portable_all(game.players());
/// assert_eq!(players[1].role, 1);
/// ```
pub fn to_portable_all<'a, T, P>(items: impl IntoIterator<Item = &'a T>) -> Vec<P>
where
    T: 'a,
    P: From<&'a T>,
{
    items.into_iter().map(P::from).collect()
}

/// Portable pairs of every entry in a move collection.
#[must_use]
pub fn portable_player_moves(moves: &PlayerMoves) -> Vec<PortablePlayerMove> {
    moves
        .iter()
        .map(|(p, m)| (PortablePlayer::from(p), PortableMove::from(m)))
        .collect()
}

/// Portable pairs of a goal vector.
#[must_use]
pub fn portable_goals(goals: &[PlayerGoal]) -> Vec<PortablePlayerGoal> {
    goals
        .iter()
        .map(|g| (PortablePlayer::from(&g.player), g.score))
        .collect()
}

impl<E: Engine> Game<E> {
    /// The player of this game with the same role.
    pub fn player_from_portable(&self, portable: &PortablePlayer) -> Result<Player> {
        self.player_at(portable.role).cloned().ok_or_else(|| {
            GdlError::IncompatibleSnapshot(format!(
                "role index {} out of range for {} roles",
                portable.role,
                self.num_players()
            ))
        })
    }

    /// The move of this game with the same role and text.
    pub fn move_from_portable(&self, portable: &PortableMove) -> Result<Move> {
        let player = self.player_from_portable(&PortablePlayer {
            role: portable.role,
        })?;
        let legal = self
            .engine()
            .find_move(portable.role, &portable.text)
            .ok_or_else(|| {
                GdlError::IncompatibleSnapshot(format!(
                    "{} is not a move of {player}",
                    portable.text
                ))
            })?;
        let hint = FactId::new(portable.relation, portable.tuple);
        if legal.fact != hint {
            warn!(
                text = %portable.text,
                captured = %hint,
                resolved = %legal.fact,
                "portable move identity differs from this game"
            );
        }
        Ok(Move::from_legal(self.id(), legal))
    }

    /// Restore a (player, move) pair.
    pub fn player_move_from_portable(&self, portable: &PortablePlayerMove) -> Result<(Player, Move)> {
        Ok((
            self.player_from_portable(&portable.0)?,
            self.move_from_portable(&portable.1)?,
        ))
    }

    /// Restore a (player, score) pair.
    pub fn player_goal_from_portable(&self, portable: &PortablePlayerGoal) -> Result<PlayerGoal> {
        if portable.1 > 100 {
            return Err(GdlError::IncompatibleSnapshot(format!(
                "goal value {} outside 0..=100",
                portable.1
            )));
        }
        Ok(PlayerGoal {
            player: self.player_from_portable(&portable.0)?,
            score: portable.1,
        })
    }

    /// Restore a joint move from portable pairs.
    pub fn joint_from_portable<'a>(
        &self,
        pairs: impl IntoIterator<Item = &'a PortablePlayerMove>,
    ) -> Result<JointMove> {
        pairs
            .into_iter()
            .map(|pair| self.player_move_from_portable(pair))
            .collect()
    }
}
