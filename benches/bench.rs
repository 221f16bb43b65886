use std::hint::black_box;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::OsRng;
use uuid_pool::generator::with_rand08::Adapter;
use uuid_pool::{ShardPool, StdSystemTime};

// Number of IDs generated per benchmark iteration (per-thread for multi-threaded).
const TOTAL_IDS: usize = 4096;

fn bench_single_thread(c: &mut Criterion) {
    let pool = ShardPool::new();
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function("v4", |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(pool.generate_v4().unwrap());
            }
        })
    });
    group.bench_function("v7", |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(pool.generate_v7().unwrap());
            }
        })
    });
    group.finish();
}

/// Runs `threads` threads generating `TOTAL_IDS` UUIDv7s each and returns the elapsed time.
fn run_contended(pool: &Arc<ShardPool>, threads: usize) -> Duration {
    let barrier = Arc::new(Barrier::new(threads + 1));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let pool = Arc::clone(pool);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..TOTAL_IDS {
                    black_box(pool.generate_v7().unwrap());
                }
            })
        })
        .collect();
    barrier.wait();
    let start = Instant::now();
    for h in handles {
        h.join().unwrap();
    }
    start.elapsed()
}

/// Compares a fully sharded pool against a single shard that every thread contends on.
fn bench_contended(c: &mut Criterion) {
    let threads = thread::available_parallelism().map_or(4, |n| n.get());
    let sharded = Arc::new(ShardPool::new());
    let single = Arc::new(ShardPool::with_shard_count(
        1,
        || Adapter(OsRng),
        StdSystemTime,
    ));

    let mut group = c.benchmark_group(format!("contended/threads/{threads}"));
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    for (name, pool) in [("sharded", &sharded), ("single_shard", &single)] {
        group.bench_function(name, |b| {
            b.iter_custom(|iters| (0..iters).map(|_| run_contended(pool, threads)).sum())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_thread, bench_contended);
criterion_main!(benches);
