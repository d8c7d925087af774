use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gdl_play::games::{RoshamboBuilder, TICTACTOE};
use gdl_play::{sexpr_to_flat, Game};
use std::hint::black_box;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile/tictactoe", |b| {
        b.iter(|| black_box(Game::new(black_box(TICTACTOE)).unwrap()))
    });
}

fn bench_playout(c: &mut Criterion) {
    let tictactoe = Game::new(TICTACTOE).unwrap();
    c.bench_function("playout/tictactoe", |b| {
        b.iter_batched(
            || tictactoe.init_state().unwrap(),
            |mut state| black_box(state.playout().unwrap()),
            BatchSize::SmallInput,
        )
    });

    let roshambo = Game::new(&RoshamboBuilder::new().rounds(9).build()).unwrap();
    c.bench_function("playout/roshambo9", |b| {
        b.iter_batched(
            || roshambo.init_state().unwrap(),
            |mut state| black_box(state.playout().unwrap()),
            BatchSize::SmallInput,
        )
    });
}

fn bench_protocol(c: &mut Criterion) {
    let game = Game::new(TICTACTOE).unwrap();
    let state = game.init_state().unwrap();
    c.bench_function("protocol/legals", |b| {
        b.iter(|| black_box(state.legals().unwrap()))
    });
    c.bench_function("protocol/play_first_joint", |b| {
        b.iter_batched(
            || (state.clone(), state.joints().unwrap().swap_remove(0)),
            |(mut s, joint)| {
                s.play(&joint).unwrap();
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("portable/roundtrip", |b| {
        b.iter(|| {
            let bytes = state.to_portable().to_bytes().unwrap();
            black_box(gdl_play::PortableState::from_bytes(&bytes).unwrap())
        })
    });
}

fn bench_notation(c: &mut Criterion) {
    let text = "(legal white (mark (pos 1 1) (pos (next 2) 3)))";
    c.bench_function("notation/sexpr_to_flat", |b| {
        b.iter(|| black_box(sexpr_to_flat(black_box(text)).unwrap()))
    });
}

criterion_group!(benches, bench_compile, bench_playout, bench_protocol, bench_notation);
criterion_main!(benches);
