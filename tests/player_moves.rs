//! Legal-move collection tests.
//!
//! These tests build collections from real legal moves in shuffled order
//! and check the grouped views.

use gdl_play::games::{RoshamboBuilder, TICTACTOE};
use gdl_play::{Game, Move, Player, PlayerMoves};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Every legal pair of the initial state, owned.
fn initial_pairs(game: &Game) -> Vec<(Player, Move)> {
    game.init_state()
        .unwrap()
        .legals()
        .unwrap()
        .iter()
        .map(|(p, m)| (p.clone(), m.clone()))
        .collect()
}

/// Test that shuffled inserts end up grouped by player.
#[test]
fn test_shuffled_inserts_grouped() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut pairs = initial_pairs(&game);
    pairs.shuffle(&mut ChaCha8Rng::seed_from_u64(3));

    let moves: PlayerMoves = pairs.into_iter().collect();
    let roles: Vec<usize> = moves.iter().map(|(p, _)| p.role()).collect();
    let mut sorted = roles.clone();
    sorted.sort_unstable();
    assert_eq!(roles, sorted);
    assert_eq!(moves.players().len(), 2);
}

/// Test that a player's view can be walked more than once.
#[test]
fn test_moves_of_restarts() {
    let game = Game::new(TICTACTOE).unwrap();
    let moves: PlayerMoves = initial_pairs(&game).into_iter().collect();
    let white = game.player("white").unwrap();

    let view = moves.moves_of(white);
    let first: Vec<&str> = view.clone().map(Move::text).collect();
    let second: Vec<&str> = view.map(Move::text).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 9);
    assert!(first.contains(&"(mark 2 3)"));
}

/// Test a player with no entries.
#[test]
fn test_absent_player_view_is_empty() {
    let game = Game::new(TICTACTOE).unwrap();
    let black = game.player("black").unwrap().clone();
    let moves: PlayerMoves = initial_pairs(&game)
        .into_iter()
        .filter(|(p, _)| *p != black)
        .collect();
    assert_eq!(moves.moves_of(&black).count(), 0);
    assert_eq!(moves.players().count(), 1);
}

/// Test extending with a second batch and clearing.
#[test]
fn test_extend_then_clear() {
    let game = Game::new(&RoshamboBuilder::new().build()).unwrap();
    let pairs = initial_pairs(&game);
    let (left, right): (Vec<_>, Vec<_>) = pairs.into_iter().partition(|(p, _)| p.role() == 0);

    let mut moves = PlayerMoves::new();
    moves.extend(right);
    assert_eq!(moves.players().count(), 1);
    moves.extend(left);
    assert_eq!(moves.len(), 6);
    assert_eq!(moves.iter().next().map(|(p, _)| p.name()), Some("left"));

    moves.clear();
    assert!(moves.is_empty());
    assert_eq!(moves.players().count(), 0);
}

/// Test the textual form of a collection.
#[test]
fn test_display() {
    let game = Game::new(TICTACTOE).unwrap();
    let black = game.player("black").unwrap();
    let moves: PlayerMoves = initial_pairs(&game)
        .into_iter()
        .filter(|(p, _)| p == black)
        .collect();
    assert_eq!(moves.to_string(), "(legal black noop)");
}
