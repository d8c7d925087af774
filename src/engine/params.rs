//! Engine compilation and playout parameters.

use serde::{Deserialize, Serialize};

/// Parameters handed to the reasoning engine when a rule set is compiled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParameters {
    /// Upper bound on the number of ground tuples any single relation may
    /// reach while the fluent and move domain is computed. Compilation fails
    /// with an engine failure above it.
    pub max_relation_size: usize,

    /// Reorder rule bodies so that the most constrained literal is joined
    /// first. Off keeps the source order, moving only negations and
    /// `distinct` as far as needed for their variables to be bound.
    pub order_rules: bool,

    /// Stop a random playout after this many rounds (`None` = run to the
    /// end). A playout cut short leaves a non-terminal state behind.
    pub max_playout_rounds: Option<u32>,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            max_relation_size: 1_000_000,
            order_rules: true,
            max_playout_rounds: None,
        }
    }
}

impl EngineParameters {
    /// Set the per-relation grounding limit.
    #[must_use]
    pub fn with_max_relation_size(mut self, size: usize) -> Self {
        self.max_relation_size = size;
        self
    }

    /// Enable or disable body reordering.
    #[must_use]
    pub fn with_order_rules(mut self, order: bool) -> Self {
        self.order_rules = order;
        self
    }

    /// Cap random playouts at `rounds` rounds.
    #[must_use]
    pub fn with_max_playout_rounds(mut self, rounds: u32) -> Self {
        self.max_playout_rounds = Some(rounds);
        self
    }
}
