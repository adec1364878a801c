//! Pipe and ring benchmarks.
//!
//! Run with: cargo bench --bench pipe_bench

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use plenum::{pipe, GrowableRing};

fn ring_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");
    group.throughput(Throughput::Elements(1));

    group.bench_function("write_pop", |b| {
        let mut ring = GrowableRing::with_cell_capacity(1024);
        b.iter(|| {
            ring.write(black_box(1u64));
            black_box(ring.pop());
        });
    });

    group.bench_function("burst_1024_then_drain", |b| {
        let mut ring = GrowableRing::with_cell_capacity(256);
        b.iter(|| {
            for i in 0..1024u64 {
                ring.write(black_box(i));
            }
            while !ring.is_empty() {
                black_box(ring.pop());
            }
            ring.reset();
        });
    });

    group.finish();
}

fn pipe_benches(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("pipe");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("end_to_end_10k", |b| {
        b.to_async(&rt).iter(|| async {
            let (tx, mut rx) = pipe::<u64>(64, 64);

            let producer = tokio::spawn(async move {
                for i in 0..10_000u64 {
                    tx.send(i).await.unwrap();
                }
            });

            let mut sum = 0u64;
            while let Some(value) = rx.recv().await {
                sum += value;
            }

            producer.await.unwrap();
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, ring_benches, pipe_benches);
criterion_main!(benches);
