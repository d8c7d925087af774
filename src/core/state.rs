//! Mutable position cursor over a game.
//!
//! ## Call discipline
//!
//! - `is_terminal`: always allowed, never mutates
//! - `legals`, `joints`, `play`, `playout`: only while not terminal
//! - `goals`: only once terminal
//!
//! Violations return [`GdlError::InvalidState`]. A terminal state stays
//! terminal.

use std::fmt;
use tracing::debug;

use super::game::Game;
use super::moves::{JointMove, Move};
use super::player::{Player, PlayerGoal};
use super::player_moves::PlayerMoves;
use super::rng::GameRng;
use crate::engine::{Engine, LegalMove};
use crate::error::{GdlError, Result};
use crate::gdl::GdlEngine;

/// A position in a game.
///
/// Owns its engine state exclusively; cloning copies it and gives the
/// clone its own random stream.
pub struct State<'g, E: Engine = GdlEngine> {
    pub(crate) game: &'g Game<E>,
    pub(crate) inner: E::State,
    rng: GameRng,
}

impl<'g, E: Engine> State<'g, E> {
    /// A new state at the initial position of `game`.
    pub fn new(game: &'g Game<E>) -> Result<Self> {
        let engine = game.engine();
        let mut inner = engine.create_state()?;
        engine.set_initial_state(&mut inner)?;
        Ok(Self::from_inner(game, inner))
    }

    pub(crate) fn from_inner(game: &'g Game<E>, inner: E::State) -> Self {
        Self {
            game,
            inner,
            rng: game.next_rng(),
        }
    }

    /// The game this state belongs to.
    #[must_use]
    pub fn game(&self) -> &'g Game<E> {
        self.game
    }

    /// Overwrite this state with a copy of `other`.
    pub fn assign(&mut self, other: &State<'_, E>) -> Result<()> {
        if self.game.id() != other.game.id() {
            return Err(GdlError::InvalidState(format!(
                "cannot assign a state of {} to a state of {}",
                other.game.id(),
                self.game.id()
            )));
        }
        self.inner = other.inner.clone();
        Ok(())
    }

    /// Is the game over?
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.game.engine().is_terminal(&self.inner)
    }

    /// Joint moves applied since the initial position.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.game.engine().round(&self.inner)
    }

    /// Engine evaluation stage of this state.
    #[must_use]
    pub fn step(&self) -> u32 {
        self.game.engine().step(&self.inner)
    }

    /// Canonical text of every true fact.
    #[must_use]
    pub fn facts(&self) -> Vec<String> {
        let engine = self.game.engine();
        engine
            .state_data(&self.inner)
            .facts
            .into_iter()
            .map(|id| engine.fact_text(id).map_or_else(|| id.to_string(), str::to_string))
            .collect()
    }

    fn require_live(&self, operation: &str) -> Result<()> {
        if self.is_terminal() {
            return Err(GdlError::InvalidState(format!(
                "{operation} called on a terminal state"
            )));
        }
        Ok(())
    }

    /// Engine legal moves, checked for the one-move-per-role guarantee.
    fn legal_moves(&self) -> Result<Vec<LegalMove>> {
        let legals = self.game.engine().legal_moves(&self.inner)?;
        let mut counts = vec![0usize; self.game.num_players()];
        for legal in &legals {
            let count = counts.get_mut(legal.role).ok_or_else(|| {
                GdlError::InternalInconsistency(format!(
                    "legal move {} for unknown role {}",
                    legal.text, legal.role
                ))
            })?;
            *count += 1;
        }
        if let Some(role) = counts.iter().position(|&c| c == 0) {
            return Err(GdlError::InternalInconsistency(format!(
                "role {} has no legal move in a non-terminal state",
                self.game.players()[role]
            )));
        }
        Ok(legals)
    }

    /// Every legal (player, move) pair, grouped by player.
    pub fn legals(&self) -> Result<PlayerMoves> {
        self.require_live("legals")?;
        let id = self.game.id();
        Ok(self
            .legal_moves()?
            .into_iter()
            .map(|legal| {
                let player = self.game.players()[legal.role].clone();
                (player, Move::from_legal(id, legal))
            })
            .collect())
    }

    /// Every combination of one legal move per player.
    pub fn joints(&self) -> Result<Vec<JointMove>> {
        let legals = self.legals()?;
        let mut joints = vec![JointMove::new()];
        for player in legals.players() {
            let mut next = Vec::with_capacity(joints.len() * legals.moves_of(player).len());
            for joint in &joints {
                for mv in legals.moves_of(player) {
                    let mut extended = joint.clone();
                    extended.insert(player.clone(), mv.clone());
                    next.push(extended);
                }
            }
            joints = next;
        }
        Ok(joints)
    }

    /// Score of every player, in role order.
    pub fn goals(&self) -> Result<Vec<PlayerGoal>> {
        if !self.is_terminal() {
            return Err(GdlError::InvalidState(
                "goals called on a non-terminal state".into(),
            ));
        }
        let values = self.game.engine().goal_values(&self.inner);
        if values.len() != self.game.num_players() {
            return Err(GdlError::InternalInconsistency(format!(
                "engine reported {} goal values for {} roles",
                values.len(),
                self.game.num_players()
            )));
        }
        self.game
            .players()
            .iter()
            .zip(values)
            .map(|(player, value)| match value {
                Some(score @ 0..=100) => Ok(PlayerGoal {
                    player: player.clone(),
                    score: score as u32,
                }),
                Some(score) => Err(GdlError::InternalInconsistency(format!(
                    "goal value {score} for {player} is outside 0..=100"
                ))),
                None => Err(GdlError::InternalInconsistency(format!(
                    "no goal value for {player} in a terminal state"
                ))),
            })
            .collect()
    }

    /// Apply a joint move.
    pub fn play(&mut self, joint: &JointMove) -> Result<()> {
        self.play_moves(joint.iter())
    }

    /// Apply one move per player, given as (player, move) pairs.
    ///
    /// The state is left untouched when the moves are rejected.
    pub fn play_moves<'m, I>(&mut self, moves: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'m Player, &'m Move)>,
    {
        self.require_live("play")?;
        let game_id = self.game.id();
        let num_players = self.game.num_players();
        let mut chosen: Vec<Option<&Move>> = vec![None; num_players];

        for (player, mv) in moves {
            if player.game_id() != game_id || mv.game_id() != game_id {
                return Err(GdlError::InvalidMove(format!(
                    "({player} {mv}) belongs to another game"
                )));
            }
            if player.role() != mv.role() {
                return Err(GdlError::InvalidMove(format!(
                    "move {mv} is not a move of {player}"
                )));
            }
            let Some(slot) = chosen.get_mut(player.role()) else {
                return Err(GdlError::InvalidMove(format!(
                    "role index {} out of range",
                    player.role()
                )));
            };
            if slot.is_some() {
                return Err(GdlError::InvalidMove(format!("more than one move for {player}")));
            }
            *slot = Some(mv);
        }

        if let Some(role) = chosen.iter().position(Option::is_none) {
            return Err(GdlError::InvalidMove(format!(
                "no move for {}",
                self.game.players()[role]
            )));
        }

        let legals = self.legal_moves()?;
        let mut joint = Vec::with_capacity(num_players);
        for mv in chosen.into_iter().flatten() {
            if !legals.iter().any(|l| l.role == mv.role && l.fact == mv.fact) {
                return Err(GdlError::InvalidMove(format!(
                    "{mv} is not legal for {}",
                    self.game.players()[mv.role]
                )));
            }
            joint.push(mv.to_legal());
        }

        let mut next = self.inner.clone();
        self.game.engine().do_move(&mut next, &joint)?;
        self.inner = next;
        debug!(
            game = %game_id,
            round = self.round(),
            moves = ?joint.iter().map(|m| &*m.text).collect::<Vec<_>>(),
            "played joint move"
        );
        Ok(())
    }

    /// Play random legal moves to the end and return the goals.
    pub fn playout(&mut self) -> Result<Vec<PlayerGoal>> {
        self.require_live("playout")?;
        let start = self.round();
        self.game.engine().play_out(&mut self.inner, &mut self.rng)?;
        let rounds = self.round() - start;
        if !self.is_terminal() {
            return Err(GdlError::InternalInconsistency(format!(
                "playout stopped in a non-terminal state after {rounds} rounds"
            )));
        }
        let goals = self.goals()?;
        debug!(
            game = %self.game.id(),
            rounds,
            goals = ?goals.iter().map(|g| g.score).collect::<Vec<_>>(),
            "playout finished"
        );
        Ok(goals)
    }
}

impl<E: Engine> Clone for State<'_, E> {
    fn clone(&self) -> Self {
        State::from_inner(self.game, self.inner.clone())
    }
}

impl<E: Engine> fmt::Debug for State<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("game", &self.game.id())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> fmt::Display for State<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.facts().join(" "))
    }
}
