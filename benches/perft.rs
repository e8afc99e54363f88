//! Perft benchmarks for the move-generation core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use atomic_chess::board::{Arbiter, Variant};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let arbiter = Arbiter::new(Variant::Ortho);
    let mut startpos = arbiter.position_from_fen(START).unwrap();
    for depth in 1..=4u32 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| arbiter.perft(&mut startpos, black_box(depth)))
        });
    }

    let mut kiwipete = arbiter.position_from_fen(KIWIPETE).unwrap();
    for depth in 1..=3u32 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| arbiter.perft(&mut kiwipete, black_box(depth)))
        });
    }

    let atomic = Arbiter::new(Variant::Atomic);
    let mut atomic_start = atomic.position_from_fen(START).unwrap();
    for depth in 1..=4u32 {
        group.bench_with_input(
            BenchmarkId::new("atomic_startpos", depth),
            &depth,
            |b, &depth| b.iter(|| atomic.perft(&mut atomic_start, black_box(depth))),
        );
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let arbiter = Arbiter::new(Variant::Ortho);
    let mut startpos = arbiter.position_from_fen(START).unwrap();
    group.bench_function("startpos", |b| {
        b.iter(|| black_box(arbiter.generate_legal(&mut startpos)))
    });

    let mut kiwipete = arbiter.position_from_fen(KIWIPETE).unwrap();
    group.bench_function("kiwipete", |b| {
        b.iter(|| black_box(arbiter.generate_legal(&mut kiwipete)))
    });

    let atomic = Arbiter::new(Variant::Atomic);
    let mut atomic_start = atomic.position_from_fen(START).unwrap();
    group.bench_function("atomic_startpos", |b| {
        b.iter(|| black_box(atomic.generate_legal(&mut atomic_start)))
    });

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen);
criterion_main!(benches);
