//! Players, goals and the game identity that binds them.
//!
//! ## GameId
//!
//! Process-unique identity of one loaded [`Game`](crate::core::Game).
//! Loading the same rules twice gives two distinct ids.
//!
//! ## Player
//!
//! A role index bound to a game. Cheap to clone; compares and hashes by
//! (game, role); displays as the role name.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one loaded game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u64);

impl GameId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GAME_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game({})", self.0)
    }
}

/// A role of a specific game.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) game: GameId,
    pub(crate) role: usize,
    pub(crate) name: Arc<str>,
}

impl Player {
    pub(crate) fn new(game: GameId, role: usize, name: Arc<str>) -> Self {
        Self { game, role, name }
    }

    /// Role index (0-based, in rule order).
    #[must_use]
    pub fn role(&self) -> usize {
        self.role
    }

    /// Role name as written in the rules.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Game this player belongs to.
    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.game == other.game && self.role == other.role
    }
}

impl Eq for Player {}

impl PartialOrd for Player {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Player {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.game, self.role).cmp(&(other.game, other.role))
    }
}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.game.hash(state);
        self.role.hash(state);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Score of one player in a terminal state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerGoal {
    /// The scored player.
    pub player: Player,
    /// Score in `0..=100`.
    pub score: u32,
}

impl fmt::Display for PlayerGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(goal {} {})", self.player, self.score)
    }
}
