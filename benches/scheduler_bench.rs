//! Benchmarks for the schedulers and the pool.
//!
//! Benchmarks cover:
//! - Insert/retrieve throughput per scheduling discipline
//! - Cost of ageing passes at different frequencies
//! - End-to-end pool throughput with the in-memory connector

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;

use prometheus_conpool::config::PoolConfig;
use prometheus_conpool::core::{
    AgeingPriorityScheduler, BoxedJob, FcfsScheduler, FnJob, Pool, PriorityScheduler, Scheduler,
};
use prometheus_conpool::infra::{InsertRow, MemoryConnector, MemoryDatabase};

// ============================================================================
// Helpers
// ============================================================================

fn noop(priority: u32) -> BoxedJob<()> {
    Box::new(FnJob::with_priority(priority, |_: &mut ()| Ok(())))
}

fn fill_and_drain<S: Scheduler<()>>(scheduler: &mut S, priorities: &[u32]) {
    for &priority in priorities {
        scheduler.insert(noop(priority));
    }
    while let Some(job) = scheduler.next_job() {
        black_box(job);
    }
}

fn random_priorities(count: usize, levels: u32) -> Vec<u32> {
    let mut rng = rand::rng();
    (0..count).map(|_| rng.random_range(0..levels)).collect()
}

// ============================================================================
// Scheduler Benchmarks
// ============================================================================

fn bench_scheduler_insert_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_insert_retrieve");

    for size in [100_u64, 1_000, 10_000] {
        let priorities = random_priorities(usize::try_from(size).unwrap(), 8);
        group.throughput(Throughput::Elements(size));

        group.bench_with_input(BenchmarkId::new("fcfs", size), &priorities, |b, p| {
            b.iter(|| fill_and_drain(&mut FcfsScheduler::new(), p));
        });
        group.bench_with_input(BenchmarkId::new("priority", size), &priorities, |b, p| {
            b.iter(|| fill_and_drain(&mut PriorityScheduler::new(8).unwrap(), p));
        });
        group.bench_with_input(BenchmarkId::new("ageing", size), &priorities, |b, p| {
            b.iter(|| fill_and_drain(&mut AgeingPriorityScheduler::new(8, 100).unwrap(), p));
        });
    }
    group.finish();
}

fn bench_ageing_frequency(c: &mut Criterion) {
    let mut group = c.benchmark_group("ageing_frequency");
    let priorities = random_priorities(2_000, 8);

    for frequency in [1_u64, 10, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(frequency),
            &frequency,
            |b, &frequency| {
                b.iter(|| {
                    fill_and_drain(
                        &mut AgeingPriorityScheduler::new(8, frequency).unwrap(),
                        &priorities,
                    );
                });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Pool Benchmarks
// ============================================================================

fn bench_pool_throughput(c: &mut Criterion) {
    const JOBS: u64 = 2_000;
    let mut group = c.benchmark_group("pool_throughput");
    group.sample_size(20);
    group.throughput(Throughput::Elements(JOBS));

    for workers in [1_usize, 2, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let pool = Pool::new(
                        PoolConfig::new()
                            .with_worker_count(workers)
                            .with_queue_capacity(256),
                        FcfsScheduler::new(),
                        MemoryConnector::new(MemoryDatabase::new()),
                    )
                    .unwrap();
                    pool.start().unwrap();
                    for age in 0..JOBS {
                        pool.submit(InsertRow::new("bench", "row", i64::try_from(age).unwrap()))
                            .unwrap();
                    }
                    pool.stop().unwrap();
                    black_box(pool.stats());
                });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    scheduler_benches,
    bench_scheduler_insert_retrieve,
    bench_ageing_frequency
);

criterion_group!(pool_benches, bench_pool_throughput);

criterion_main!(scheduler_benches, pool_benches);
