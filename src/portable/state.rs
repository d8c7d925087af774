//! Portable state snapshots and their binary wire form.
//!
//! The wire form is the bincode encoding of [`PortableState`]:
//! `round`, `step`, the fact count, then each fact as
//! `(relation, tuple)`, all in ascending order.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Game, State};
use crate::engine::{Engine, FactId, StateData};
use crate::error::Result;

/// Engine-instance independent snapshot of a state.
///
/// Ordering is lexicographic over (round, step, facts); hashing agrees
/// with equality. Clones share structure.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortableState {
    /// Joint moves applied since the initial state.
    pub round: u32,
    /// Engine evaluation stage.
    pub step: u32,
    /// Every true fact.
    pub facts: OrdSet<FactId>,
}

impl PortableState {
    /// Encode to the binary wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the binary wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn to_data(&self) -> StateData {
        StateData {
            round: self.round,
            step: self.step,
            facts: self.facts.iter().copied().collect(),
        }
    }
}

impl From<StateData> for PortableState {
    fn from(data: StateData) -> Self {
        Self {
            round: data.round,
            step: data.step,
            facts: data.facts.into_iter().collect(),
        }
    }
}

impl<E: Engine> From<&State<'_, E>> for PortableState {
    fn from(state: &State<'_, E>) -> Self {
        state.game.engine().state_data(&state.inner).into()
    }
}

impl<'g, E: Engine> State<'g, E> {
    /// Snapshot this state.
    #[must_use]
    pub fn to_portable(&self) -> PortableState {
        PortableState::from(self)
    }

    /// Rebuild a snapshot as a state of `game`.
    pub fn from_portable(game: &'g Game<E>, portable: &PortableState) -> Result<Self> {
        let engine = game.engine();
        let mut inner = engine.create_state()?;
        engine.set_state_data(&mut inner, &portable.to_data())?;
        debug!(
            game = %game.id(),
            round = portable.round,
            facts = portable.facts.len(),
            "restored portable state"
        );
        Ok(State::from_inner(game, inner))
    }

    /// Replace this state's contents with a snapshot.
    ///
    /// The state is left untouched when the snapshot is rejected.
    pub fn load(&mut self, portable: &PortableState) -> Result<()> {
        let mut next = self.inner.clone();
        self.game
            .engine()
            .set_state_data(&mut next, &portable.to_data())?;
        self.inner = next;
        debug!(
            game = %self.game.id(),
            round = portable.round,
            facts = portable.facts.len(),
            "loaded portable state"
        );
        Ok(())
    }
}
