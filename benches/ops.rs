//! Micro-operation benchmarks for single layers and layer chains.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for get and insert operations
//! through the public `Cache` API, so every number includes lazy expiration,
//! reconciliation, and store bookkeeping.

use std::hint::black_box;
use std::time::{Duration, Instant};

use chaincache::builder::{CacheBuilder, CachePolicy};
use chaincache::cache::Cache;
use chaincache::policy::EvictionPolicy;
use chaincache::policy::fifo::FifoPolicy;
use chaincache::policy::lfu::LfuPolicy;
use chaincache::policy::lru::LruPolicy;
use chaincache::policy::random::RandomPolicy;
use chaincache::policy::ttl::TtlPolicy;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;
const MAX_AGE: Duration = Duration::from_secs(3600);

fn warm<P: EvictionPolicy<u64>>(policy: P) -> Cache<u64, u64, P> {
    let cache = Cache::new(policy);
    for i in 0..CAPACITY as u64 {
        cache.insert(i, i);
    }
    cache
}

fn builder_chain() -> CacheBuilder {
    CacheBuilder::new()
        .layer(CachePolicy::Lru { capacity: CAPACITY })
        .layer(CachePolicy::Ttl { max_age: MAX_AGE })
        .store_capacity(CAPACITY)
}

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn time_hits<P: EvictionPolicy<u64>>(cache: &Cache<u64, u64, P>, iters: u64) -> Duration {
    let start = Instant::now();
    for _ in 0..iters {
        for i in 0..OPS {
            let key = i % (CAPACITY as u64);
            black_box(cache.get(&key).ok());
        }
    }
    start.elapsed()
}

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("fifo", |b| {
        b.iter_custom(|iters| time_hits(&warm(FifoPolicy::new(CAPACITY)), iters))
    });

    group.bench_function("lru", |b| {
        b.iter_custom(|iters| time_hits(&warm(LruPolicy::new(CAPACITY)), iters))
    });

    group.bench_function("lfu", |b| {
        b.iter_custom(|iters| time_hits(&warm(LfuPolicy::new(CAPACITY)), iters))
    });

    // lru over ttl, statically dispatched
    group.bench_function("lru_ttl", |b| {
        b.iter_custom(|iters| {
            let chain = LruPolicy::with_inner(CAPACITY, TtlPolicy::new(MAX_AGE));
            time_hits(&warm(chain), iters)
        })
    });

    // same chain through boxed layers
    group.bench_function("builder_lru_ttl", |b| {
        b.iter_custom(|iters| {
            let policy = builder_chain().build_policy::<u64>().unwrap();
            time_hits(&warm(policy), iters)
        })
    });

    group.finish();
}

// ============================================================================
// Insert With Eviction (ns/op)
// ============================================================================

fn time_inserts<P: EvictionPolicy<u64>>(cache: &Cache<u64, u64, P>, iters: u64) -> Duration {
    let start = Instant::now();
    let mut next = CAPACITY as u64;
    for _ in 0..iters {
        for _ in 0..OPS {
            black_box(cache.insert(next, next));
            next += 1;
        }
    }
    start.elapsed()
}

fn bench_insert_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_evict_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("fifo", |b| {
        b.iter_custom(|iters| time_inserts(&warm(FifoPolicy::new(CAPACITY)), iters))
    });

    group.bench_function("lru", |b| {
        b.iter_custom(|iters| time_inserts(&warm(LruPolicy::new(CAPACITY)), iters))
    });

    group.bench_function("lfu", |b| {
        b.iter_custom(|iters| time_inserts(&warm(LfuPolicy::new(CAPACITY)), iters))
    });

    group.bench_function("random", |b| {
        b.iter_custom(|iters| {
            time_inserts(&warm(RandomPolicy::with_seed(CAPACITY, 42)), iters)
        })
    });

    group.bench_function("lru_ttl", |b| {
        b.iter_custom(|iters| {
            let chain = LruPolicy::with_inner(CAPACITY, TtlPolicy::new(MAX_AGE));
            time_inserts(&warm(chain), iters)
        })
    });

    group.finish();
}

// ============================================================================
// Mixed Workload (80% hits, 20% misses that insert)
// ============================================================================

fn time_mixed<P: EvictionPolicy<u64>>(cache: &Cache<u64, u64, P>) -> Duration {
    let start = Instant::now();
    for i in 0..OPS {
        let key = if i % 5 == 0 {
            CAPACITY as u64 + i
        } else {
            i % (CAPACITY as u64)
        };
        if cache.get(&key).is_err() {
            cache.insert(key, key);
        }
    }
    start.elapsed()
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("lru", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                total += time_mixed(&warm(LruPolicy::new(CAPACITY)));
            }
            total
        })
    });

    group.bench_function("lfu_over_fifo", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let chain = LfuPolicy::with_inner(CAPACITY, FifoPolicy::new(CAPACITY));
                total += time_mixed(&warm(chain));
            }
            total
        })
    });

    group.bench_function("builder_lru_ttl", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let policy = builder_chain().build_policy::<u64>().unwrap();
                total += time_mixed(&warm(policy));
            }
            total
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert_evict, bench_mixed);
criterion_main!(benches);
