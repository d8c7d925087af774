//! Game/State protocol tests.
//!
//! These tests drive complete games through the public protocol and check
//! that rejected calls never change a state.

use gdl_play::games::{RoshamboBuilder, TICTACTOE};
use gdl_play::{Game, GameConfig, GameSource, GdlError, JointMove, Move, Player, State};

/// Find the move with the given text for a role.
fn find(state: &State<'_>, player: &Player, text: &str) -> Move {
    state
        .legals()
        .unwrap()
        .moves_of(player)
        .find(|m| m.text() == text)
        .cloned()
        .unwrap_or_else(|| panic!("{text} is not legal for {player}"))
}

/// Build a tic-tac-toe joint move; the idle role plays `noop`.
fn turn(game: &Game, state: &State<'_>, mover: &str, text: &str) -> JointMove {
    game.players()
        .iter()
        .map(|p| {
            let t = if p.name() == mover { text } else { "noop" };
            (p.clone(), find(state, p, t))
        })
        .collect()
}

/// Test a full tic-tac-toe game won by white on the top row.
#[test]
fn test_tictactoe_white_wins() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();

    let script = [
        ("white", "(mark 1 1)"),
        ("black", "(mark 2 1)"),
        ("white", "(mark 1 2)"),
        ("black", "(mark 2 2)"),
        ("white", "(mark 1 3)"),
    ];
    for (round, (mover, text)) in script.iter().enumerate() {
        assert!(!state.is_terminal(), "terminal before round {round}");
        let joint = turn(&game, &state, mover, text);
        state.play(&joint).unwrap();
        assert_eq!(state.round(), round as u32 + 1);
    }

    assert!(state.is_terminal());
    let goals = state.goals().unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].player.name(), "white");
    assert_eq!(goals[0].score, 100);
    assert_eq!(goals[1].score, 0);
    assert_eq!(goals[0].to_string(), "(goal white 100)");
}

/// Test a full board without a line: both roles score 50.
#[test]
fn test_tictactoe_draw() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();

    // x o x
    // x o o
    // o x x
    let script = [
        ("white", "(mark 1 1)"),
        ("black", "(mark 1 2)"),
        ("white", "(mark 1 3)"),
        ("black", "(mark 2 2)"),
        ("white", "(mark 3 2)"),
        ("black", "(mark 2 3)"),
        ("white", "(mark 2 1)"),
        ("black", "(mark 3 1)"),
        ("white", "(mark 3 3)"),
    ];
    for (round, (mover, text)) in script.iter().enumerate() {
        assert!(!state.is_terminal(), "terminal before round {round}");
        let joint = turn(&game, &state, mover, text);
        state.play(&joint).unwrap();
    }

    assert!(state.is_terminal());
    assert_eq!(state.round(), 9);
    let scores: Vec<u32> = state.goals().unwrap().iter().map(|g| g.score).collect();
    assert_eq!(scores, [50, 50]);
}

/// Test that random playouts only ever end in a win, a loss or a draw.
#[test]
fn test_playout_goal_vectors() {
    let mut seen = Vec::new();
    for seed in 0..64 {
        let config = GameConfig::default().with_seed(seed);
        let game = Game::load(GameSource::text(TICTACTOE), config).unwrap();
        let mut state = game.init_state().unwrap();
        let scores: Vec<u32> = state.playout().unwrap().iter().map(|g| g.score).collect();
        assert!(
            matches!(scores.as_slice(), [100, 0] | [0, 100] | [50, 50]),
            "seed {seed} scored {scores:?}"
        );
        assert!((5..=9).contains(&state.round()), "seed {seed}");
        if !seen.contains(&scores) {
            seen.push(scores);
        }
    }
    assert!(seen.len() >= 2, "64 playouts all scored {seen:?}");
}

/// Test that the idle role only has `noop`.
#[test]
fn test_tictactoe_initial_moves() {
    let game = Game::new(TICTACTOE).unwrap();
    let state = game.init_state().unwrap();
    let legals = state.legals().unwrap();
    let black = game.player("black").unwrap();
    let texts: Vec<&str> = legals.moves_of(black).map(Move::text).collect();
    assert_eq!(texts, ["noop"]);
    assert_eq!(legals.len(), 10);
}

/// Test that a joint move missing a role is rejected without mutation.
#[test]
fn test_missing_role_rejected() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let before = state.to_portable();

    let white = game.player("white").unwrap();
    let joint: JointMove = [(white.clone(), find(&state, white, "(mark 1 1)"))]
        .into_iter()
        .collect();
    assert!(matches!(state.play(&joint), Err(GdlError::InvalidMove(_))));
    assert_eq!(state.to_portable(), before);
}

/// Test that two moves for one role are rejected without mutation.
#[test]
fn test_duplicate_role_rejected() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let before = state.to_portable();

    let white = game.player("white").unwrap();
    let black = game.player("black").unwrap();
    let a = find(&state, white, "(mark 1 1)");
    let b = find(&state, white, "(mark 2 2)");
    let noop = find(&state, black, "noop");
    let pairs = [(white, &a), (white, &b), (black, &noop)];
    let result = state.play_moves(pairs.iter().map(|&(p, m)| (p, m)));
    assert!(matches!(result, Err(GdlError::InvalidMove(_))));
    assert_eq!(state.to_portable(), before);
}

/// Test that a move paired with the wrong role is rejected.
#[test]
fn test_role_mismatch_rejected() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let white = game.player("white").unwrap();
    let black = game.player("black").unwrap();
    let mark = find(&state, white, "(mark 1 1)");
    let noop = find(&state, black, "noop");
    let result = state.play_moves([(white, &noop), (black, &mark)]);
    assert!(matches!(result, Err(GdlError::InvalidMove(_))));
    assert_eq!(state.round(), 0);
}

/// Test that a move no longer legal is rejected.
#[test]
fn test_stale_move_rejected() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let first = turn(&game, &state, "white", "(mark 1 1)");
    state.play(&first).unwrap();

    // Replaying white's mark: white is now idle and the cell is taken.
    let before = state.to_portable();
    assert!(matches!(state.play(&first), Err(GdlError::InvalidMove(_))));
    assert_eq!(state.to_portable(), before);
}

/// Test that players and moves from another game are rejected.
#[test]
fn test_foreign_objects_rejected() {
    let a = Game::new(TICTACTOE).unwrap();
    let b = Game::new(TICTACTOE).unwrap();
    let mut state = a.init_state().unwrap();
    let other = b.init_state().unwrap();
    let foreign = turn(&b, &other, "white", "(mark 1 1)");
    assert!(matches!(state.play(&foreign), Err(GdlError::InvalidMove(_))));
    assert_eq!(state.round(), 0);
}

/// Test terminal call discipline after a scripted game.
#[test]
fn test_terminal_is_absorbing() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    state.playout().unwrap();
    let after = state.to_portable();

    assert!(state.is_terminal());
    assert!(matches!(state.legals(), Err(GdlError::InvalidState(_))));
    assert!(matches!(state.playout(), Err(GdlError::InvalidState(_))));
    assert!(state.goals().is_ok());
    assert_eq!(state.to_portable(), after);
}

/// Test that joint move count is the product of per-role counts.
#[test]
fn test_joints_product() {
    let game = Game::new(&RoshamboBuilder::new().rounds(2).build()).unwrap();
    let state = game.init_state().unwrap();
    let legals = state.legals().unwrap();
    let product: usize = game
        .players()
        .iter()
        .map(|p| legals.moves_of(p).len())
        .product();
    assert_eq!(product, 9);
    let joints = state.joints().unwrap();
    assert_eq!(joints.len(), product);
    assert!(joints.iter().all(|j| j.len() == 2));
}

/// Test a simultaneous-move game through every round.
#[test]
fn test_roshambo_rounds() {
    let game = Game::new(&RoshamboBuilder::new().rounds(3).build()).unwrap();
    let mut state = game.init_state().unwrap();
    let left = game.player("left").unwrap();
    let right = game.player("right").unwrap();

    for _ in 0..3 {
        let joint: JointMove = [
            (left.clone(), find(&state, left, "(throw rock)")),
            (right.clone(), find(&state, right, "(throw scissors)")),
        ]
        .into_iter()
        .collect();
        assert_eq!(joint.to_string(), "(does left (throw rock)) (does right (throw scissors))");
        state.play(&joint).unwrap();
    }

    assert!(state.is_terminal());
    let scores: Vec<u32> = state.goals().unwrap().iter().map(|g| g.score).collect();
    assert_eq!(scores, [100, 0]);
}

/// Test that every played joint keeps a clone untouched.
#[test]
fn test_clone_then_diverge() {
    let game = Game::new(TICTACTOE).unwrap();
    let mut state = game.init_state().unwrap();
    let snapshot = state.clone();
    let joint = turn(&game, &state, "white", "(mark 3 3)");
    state.play(&joint).unwrap();
    assert_eq!(snapshot.round(), 0);
    assert_eq!(snapshot.legals().unwrap().len(), 10);
    assert_eq!(state.legals().unwrap().len(), 9);
}

/// Test that equal seeds give equal playouts across games.
#[test]
fn test_playouts_reproducible_per_seed() {
    let config = || GameConfig::default().with_seed(7);
    let a = Game::load(GameSource::text(TICTACTOE), config()).unwrap();
    let b = Game::load(GameSource::text(TICTACTOE), config()).unwrap();

    let mut sa = a.init_state().unwrap();
    let mut sb = b.init_state().unwrap();
    sa.playout().unwrap();
    sb.playout().unwrap();
    assert_eq!(sa.to_portable(), sb.to_portable());
}
