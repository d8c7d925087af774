//! The primitive interface the protocol layer drives.
//!
//! An [`Engine`] is one compiled rule set. It owns the compiled
//! representation and operates on opaque per-position states. Everything
//! above it (legality checks, one-move-per-role, terminal call discipline,
//! portable snapshots) is enforced by [`crate::core`], so an engine only has
//! to be correct on well-formed input.
//!
//! ## Implementation Notes
//!
//! - `legal_moves`: sorted by role, then by fact identity
//! - `do_move`: receives exactly one move per role, ordered by role
//! - `goal_values`: one entry per role; `None` when the rules give no value
//! - `play_out`: must end in a terminal state unless a round cap stops it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::GameRng;
use crate::error::Result;

/// Identity of a ground fact or move inside one compiled rule set.
///
/// `relation` indexes the engine's relation table; `tuple` indexes the
/// ground instances of that relation. Two compilations of byte-identical
/// rule text assign identical identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactId {
    /// Relation table index.
    pub relation: u32,
    /// Tuple index within the relation.
    pub tuple: u32,
}

impl FactId {
    /// Create a fact identity.
    #[must_use]
    pub const fn new(relation: u32, tuple: u32) -> Self {
        Self { relation, tuple }
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.relation, self.tuple)
    }
}

/// A move the engine reports as legal (or resolves by text).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LegalMove {
    /// Role index of the mover.
    pub role: usize,
    /// Engine identity of the move.
    pub fact: FactId,
    /// Canonical S-expression text of the move term.
    pub text: Arc<str>,
}

/// Raw contents of an engine state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateData {
    /// Joint moves applied since the initial state.
    pub round: u32,
    /// Evaluation stage: 1 once the state is known terminal, 2 once legal
    /// moves are evaluated.
    pub step: u32,
    /// Every true fluent, ascending.
    pub facts: Vec<FactId>,
}

/// A compiled rule set.
///
/// States are plain values: cloning one copies it, dropping it frees it.
pub trait Engine {
    /// Opaque per-position state.
    type State: Clone + fmt::Debug;

    /// Number of roles defined by the rules.
    fn num_roles(&self) -> usize;

    /// Name of a role as written in the rules.
    fn role_name(&self, role: usize) -> &str;

    /// Allocate a fresh state. Its contents are unspecified until
    /// [`Engine::set_initial_state`] or [`Engine::set_state_data`] is called.
    fn create_state(&self) -> Result<Self::State>;

    /// Reset a state to the initial position.
    fn set_initial_state(&self, state: &mut Self::State) -> Result<()>;

    /// Every (role, move) pair legal in a non-terminal state.
    fn legal_moves(&self, state: &Self::State) -> Result<Vec<LegalMove>>;

    /// Apply one move per role.
    fn do_move(&self, state: &mut Self::State, moves: &[LegalMove]) -> Result<()>;

    /// Is the state terminal?
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Goal value per role, in role order.
    fn goal_values(&self, state: &Self::State) -> Vec<Option<i64>>;

    /// Play uniformly random legal joint moves until the state is terminal.
    fn play_out(&self, state: &mut Self::State, rng: &mut GameRng) -> Result<()>;

    /// Read the raw state contents.
    fn state_data(&self, state: &Self::State) -> StateData;

    /// Joint moves applied since the initial state.
    ///
    /// Engines that keep the counter in the state should override this; the
    /// default copies the whole state through [`Engine::state_data`].
    fn round(&self, state: &Self::State) -> u32 {
        self.state_data(state).round
    }

    /// Evaluation stage of a state, as in [`StateData::step`].
    fn step(&self, state: &Self::State) -> u32 {
        self.state_data(state).step
    }

    /// Overwrite a state with raw contents.
    fn set_state_data(&self, state: &mut Self::State, data: &StateData) -> Result<()>;

    /// Resolve a move by role and text.
    fn find_move(&self, role: usize, text: &str) -> Option<LegalMove>;

    /// Canonical text of a fluent, if the identity is known.
    fn fact_text(&self, fact: FactId) -> Option<&str>;
}
