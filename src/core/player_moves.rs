//! Multi-view collection of (player, move) pairs.
//!
//! Entries live in one sequence kept grouped by player (in player order),
//! so every player's moves occupy one contiguous range. The set of distinct
//! players is maintained alongside on insertion. All views borrow the
//! collection; nothing is copied.

use std::collections::BTreeSet;
use std::fmt;
use std::iter::FusedIterator;

use super::moves::Move;
use super::player::Player;

/// Legal moves grouped by player.
///
/// ```
/// use gdl_play::{Game, State};
/// use gdl_play::games::TICTACTOE;
///
/// let game = Game::new(TICTACTOE).unwrap();
/// let state = State::new(&game).unwrap();
/// let legals = state.legals().unwrap();
///
/// let white = game.player("white").unwrap();
/// assert_eq!(legals.moves_of(white).count(), 9);
/// assert_eq!(legals.players().count(), 2);
/// assert_eq!(legals.len(), 10);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerMoves {
    entries: Vec<(Player, Move)>,
    players: BTreeSet<Player>,
}

impl PlayerMoves {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair at the end of its player's range.
    pub fn insert(&mut self, player: Player, mv: Move) {
        if !self.players.contains(&player) {
            self.players.insert(player.clone());
        }
        if self.entries.last().map_or(true, |(last, _)| *last <= player) {
            self.entries.push((player, mv));
        } else {
            let at = self.entries.partition_point(|(p, _)| *p <= player);
            self.entries.insert(at, (player, mv));
        }
    }

    /// Total number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the collection empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every pair.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.players.clear();
    }

    /// All pairs, grouped by player.
    pub fn iter(&self) -> impl Iterator<Item = (&Player, &Move)> + Clone {
        self.entries.iter().map(|(p, m)| (p, m))
    }

    /// Distinct players, in player order.
    pub fn players(&self) -> impl ExactSizeIterator<Item = &Player> + Clone {
        self.players.iter()
    }

    /// The moves of one player. Empty if the player has none.
    #[must_use]
    pub fn moves_of(&self, player: &Player) -> MovesOf<'_> {
        let lo = self.entries.partition_point(|(p, _)| p < player);
        let hi = self.entries.partition_point(|(p, _)| p <= player);
        MovesOf {
            inner: self.entries[lo..hi].iter(),
        }
    }

    /// Is `mv` listed for `player`?
    #[must_use]
    pub fn contains(&self, player: &Player, mv: &Move) -> bool {
        self.moves_of(player).any(|m| m == mv)
    }
}

/// Iterator over one player's moves. Clone it to restart.
#[derive(Clone, Debug)]
pub struct MovesOf<'a> {
    inner: std::slice::Iter<'a, (Player, Move)>,
}

impl<'a> Iterator for MovesOf<'a> {
    type Item = &'a Move;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, m)| m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for MovesOf<'_> {}

impl FusedIterator for MovesOf<'_> {}

impl Extend<(Player, Move)> for PlayerMoves {
    fn extend<I: IntoIterator<Item = (Player, Move)>>(&mut self, iter: I) {
        let old_len = self.entries.len();
        self.entries.extend(iter);
        for (player, _) in &self.entries[old_len..] {
            if !self.players.contains(player) {
                self.players.insert(player.clone());
            }
        }
        // stable, so each player's pairs keep their insertion order
        let from = old_len.saturating_sub(1);
        if self.entries[from..].windows(2).any(|w| w[0].0 > w[1].0) {
            self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        }
    }
}

impl FromIterator<(Player, Move)> for PlayerMoves {
    fn from_iter<I: IntoIterator<Item = (Player, Move)>>(iter: I) -> Self {
        let mut moves = Self::new();
        moves.extend(iter);
        moves
    }
}

impl fmt::Display for PlayerMoves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (player, mv)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "(legal {player} {mv})")?;
        }
        Ok(())
    }
}
