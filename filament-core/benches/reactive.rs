//! Benchmarks for the hot paths of the reactive graph: untracked reads,
//! leaf writes fanning out to observers, batched writes, and object merges.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use filament_core::{batch, observe, Signal, Value};

fn bench_reads(c: &mut Criterion) {
    let signal = Signal::new(42);

    c.bench_function("untracked_leaf_read", |b| {
        b.iter(|| black_box(signal.get()));
    });

    let nested = Signal::new(Value::map([(
        "pos",
        Value::map([("x", 1), ("y", 2)]),
    )]));

    c.bench_function("untracked_nested_prop_read", |b| {
        b.iter(|| black_box(nested.prop("pos").prop("x").get()));
    });
}

fn bench_writes(c: &mut Criterion) {
    let signal = Signal::new(0);
    let _observer = observe(move || {
        black_box(signal.get());
    });

    c.bench_function("leaf_write_one_observer", |b| {
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            signal.set(n);
        });
    });

    let a = Signal::new(0);
    let bsig = Signal::new(0);
    let _pair_observer = observe(move || {
        black_box(a.get());
        black_box(bsig.get());
    });

    c.bench_function("batched_pair_write", |b| {
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            batch(|| {
                a.set(n);
                bsig.set(n + 1);
            });
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    let pos = Signal::new(Value::map([("x", 0), ("y", 0)]));
    let _observer = observe(move || {
        black_box(pos.get());
    });

    c.bench_function("object_merge_write", |b| {
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            pos.set(Value::map([("x", n), ("y", n)]));
        });
    });
}

criterion_group!(benches, bench_reads, bench_writes, bench_merge);
criterion_main!(benches);
