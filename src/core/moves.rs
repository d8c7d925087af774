//! Moves and joint moves.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::player::{GameId, Player};
use crate::engine::{FactId, LegalMove};

/// A move of one role, bound to the game that produced it.
///
/// Compares by (game, role, engine identity); displays as its canonical
/// S-expression text.
#[derive(Clone, Debug)]
pub struct Move {
    pub(crate) game: GameId,
    pub(crate) role: usize,
    pub(crate) fact: FactId,
    pub(crate) text: Arc<str>,
}

impl Move {
    pub(crate) fn from_legal(game: GameId, legal: LegalMove) -> Self {
        Self {
            game,
            role: legal.role,
            fact: legal.fact,
            text: legal.text,
        }
    }

    /// Role index this move belongs to.
    #[must_use]
    pub fn role(&self) -> usize {
        self.role
    }

    /// Canonical S-expression text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Engine identity of the move.
    #[must_use]
    pub fn fact(&self) -> FactId {
        self.fact
    }

    /// Game this move belongs to.
    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game
    }

    pub(crate) fn to_legal(&self) -> LegalMove {
        LegalMove {
            role: self.role,
            fact: self.fact,
            text: Arc::clone(&self.text),
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.game == other.game && self.role == other.role && self.fact == other.fact
    }
}

impl Eq for Move {}

impl std::hash::Hash for Move {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.game.hash(state);
        self.role.hash(state);
        self.fact.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One move per player, applied together.
///
/// Displays as `(does role move)` entries in role order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JointMove {
    moves: BTreeMap<Player, Move>,
}

impl JointMove {
    /// Create an empty joint move.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the move of a player, returning the move it replaces.
    pub fn insert(&mut self, player: Player, mv: Move) -> Option<Move> {
        self.moves.insert(player, mv)
    }

    /// The move chosen for a player.
    #[must_use]
    pub fn get(&self, player: &Player) -> Option<&Move> {
        self.moves.get(player)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Is it empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Entries in player order.
    pub fn iter(&self) -> impl Iterator<Item = (&Player, &Move)> {
        self.moves.iter()
    }
}

impl FromIterator<(Player, Move)> for JointMove {
    fn from_iter<I: IntoIterator<Item = (Player, Move)>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a JointMove {
    type Item = (&'a Player, &'a Move);
    type IntoIter = std::collections::btree_map::Iter<'a, Player, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl fmt::Display for JointMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (player, mv)) in self.moves.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "(does {player} {mv})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(game: GameId, role: usize, tuple: u32, text: &str) -> Move {
        Move {
            game,
            role,
            fact: FactId::new(5, tuple),
            text: Arc::from(text),
        }
    }

    #[test]
    fn test_move_equality() {
        let game = GameId::next();
        assert_eq!(mv(game, 0, 1, "noop"), mv(game, 0, 1, "noop"));
        assert_ne!(mv(game, 0, 1, "noop"), mv(game, 1, 1, "noop"));
        assert_ne!(mv(game, 0, 1, "noop"), mv(GameId::next(), 0, 1, "noop"));
    }

    #[test]
    fn test_joint_move_display_in_role_order() {
        let game = GameId::next();
        let white = Player::new(game, 0, Arc::from("white"));
        let black = Player::new(game, 1, Arc::from("black"));
        let mut joint = JointMove::new();
        joint.insert(black.clone(), mv(game, 1, 0, "noop"));
        joint.insert(white.clone(), mv(game, 0, 3, "(mark 1 1)"));
        assert_eq!(joint.to_string(), "(does white (mark 1 1)) (does black noop)");
        assert_eq!(joint.len(), 2);
        assert_eq!(joint.get(&white).map(Move::text), Some("(mark 1 1)"));
    }

    #[test]
    fn test_joint_move_replaces() {
        let game = GameId::next();
        let white = Player::new(game, 0, Arc::from("white"));
        let mut joint = JointMove::new();
        assert!(joint.insert(white.clone(), mv(game, 0, 1, "a")).is_none());
        let old = joint.insert(white, mv(game, 0, 2, "b"));
        assert_eq!(old.map(|m| m.text().to_string()), Some("a".to_string()));
        assert_eq!(joint.len(), 1);
    }
}
