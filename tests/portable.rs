//! Portable representation tests.
//!
//! Snapshots are taken in one game and restored into a second game loaded
//! from the same rule text.

use gdl_play::games::{RoshamboBuilder, TICTACTOE};
use gdl_play::portable::{portable_goals, portable_player_moves, to_portable_all};
use gdl_play::{
    Game, GdlError, Move, PortableMove, PortablePlayer, PortableState, State,
};

/// Legal move texts of every player, in order.
fn legal_texts(state: &State<'_>) -> Vec<String> {
    state
        .legals()
        .unwrap()
        .iter()
        .map(|(p, m)| format!("{p} {m}"))
        .collect()
}

/// Advance a state by picking the first joint move `rounds` times.
fn advance(state: &mut State<'_>, rounds: usize) {
    for _ in 0..rounds {
        let joint = state.joints().unwrap().swap_remove(0);
        state.play(&joint).unwrap();
    }
}

/// Test a non-terminal snapshot restored into another game.
#[test]
fn test_non_terminal_across_games() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut source = a.init_state().unwrap();
    advance(&mut source, 3);

    let snapshot = source.to_portable();
    assert_eq!(snapshot.round, 3);
    let restored = State::from_portable(&b, &snapshot).unwrap();

    assert!(!restored.is_terminal());
    assert_eq!(restored.round(), 3);
    assert_eq!(legal_texts(&restored), legal_texts(&source));
    assert_eq!(restored.facts(), source.facts());
}

/// Test a terminal snapshot restored into another game.
#[test]
fn test_terminal_across_games() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut source = a.init_state().unwrap();
    let goals = source.playout().unwrap();

    let restored = State::from_portable(&b, &source.to_portable()).unwrap();
    assert!(restored.is_terminal());
    let restored_goals = restored.goals().unwrap();
    assert_eq!(portable_goals(&restored_goals), portable_goals(&goals));
    assert!(matches!(restored.legals(), Err(GdlError::InvalidState(_))));
}

/// Test that a restored state keeps playing like the source.
#[test]
fn test_restored_state_continues() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut source = a.init_state().unwrap();
    advance(&mut source, 2);
    let mut restored = State::from_portable(&b, &source.to_portable()).unwrap();

    advance(&mut source, 1);
    advance(&mut restored, 1);
    assert_eq!(source.to_portable(), restored.to_portable());
}

/// Test in-place loading over an existing state.
#[test]
fn test_load_in_place() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut source = a.init_state().unwrap();
    advance(&mut source, 4);

    let mut target = b.init_state().unwrap();
    target.load(&source.to_portable()).unwrap();
    assert_eq!(target.round(), 4);
    assert_eq!(legal_texts(&target), legal_texts(&source));
}

/// Test that a joint move survives the trip between games.
#[test]
fn test_joint_move_across_games() {
    let a = Game::new(&RoshamboBuilder::new().build()).unwrap();
    let b = Game::new(&RoshamboBuilder::new().build()).unwrap();
    let sa = a.init_state().unwrap();
    let mut sb = b.init_state().unwrap();

    let legals = sa.legals().unwrap();
    let pairs = portable_player_moves(&legals);
    assert_eq!(pairs.len(), 6);

    let joint = sa.joints().unwrap().swap_remove(4);
    let portable: Vec<_> = joint
        .iter()
        .map(|(p, m)| (PortablePlayer::from(p), PortableMove::from(m)))
        .collect();
    let rebuilt = b.joint_from_portable(&portable).unwrap();
    sb.play(&rebuilt).unwrap();
    assert_eq!(sb.round(), 1);
}

/// Test that batch conversion keeps order.
#[test]
fn test_batch_conversion() {
    let game = Game::new(TICTACTOE).unwrap();
    let state = game.init_state().unwrap();
    let legals = state.legals().unwrap();
    let white = game.player("white").unwrap();
    let moves: Vec<&Move> = legals.moves_of(white).collect();
    let portable: Vec<PortableMove> = to_portable_all(moves.iter().copied());
    assert_eq!(portable.len(), 9);
    assert!(portable.iter().all(|m| m.role == 0));
    assert_eq!(portable[0].text, moves[0].text());
}

/// Test the binary wire form between games.
#[test]
fn test_wire_roundtrip_across_games() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut source = a.init_state().unwrap();
    advance(&mut source, 2);

    let bytes = source.to_portable().to_bytes().unwrap();
    let decoded = PortableState::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, source.to_portable());
    let restored = State::from_portable(&b, &decoded).unwrap();
    assert_eq!(restored.to_portable().to_bytes().unwrap(), bytes);
}

/// Test the JSON form of a state snapshot.
#[test]
fn test_json_roundtrip() {
    let game = Game::new(TICTACTOE).unwrap();
    let snapshot = game.init_state().unwrap().to_portable();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: PortableState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

/// Test that snapshots of another rule set are rejected.
#[test]
fn test_foreign_rules_rejected() {
    let ttt = Game::new(TICTACTOE).unwrap();
    let rps = Game::new(&RoshamboBuilder::new().build()).unwrap();
    let mut snapshot = ttt.init_state().unwrap().to_portable();
    snapshot.facts.insert(gdl_play::FactId::new(u32::MAX, 0));
    assert!(matches!(
        State::from_portable(&rps, &snapshot),
        Err(GdlError::IncompatibleSnapshot(_))
    ));

    let move_text = PortableMove {
        role: 0,
        text: "(mark 1 1)".into(),
        relation: 0,
        tuple: 0,
    };
    assert!(matches!(
        rps.move_from_portable(&move_text),
        Err(GdlError::IncompatibleSnapshot(_))
    ));
}

/// Test that snapshots order and compare by value.
#[test]
fn test_snapshots_are_values() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let first = state.to_portable();
    advance(&mut state, 1);
    let second = state.to_portable();
    assert!(first < second);
    let set: std::collections::HashSet<PortableState> =
        [first.clone(), second, first].into_iter().collect();
    assert_eq!(set.len(), 2);
}
