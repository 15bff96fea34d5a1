use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use writeback_cache::{CacheBuilder, NoopHook, Workload};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const OPS_PER_THREAD: u64 = 10_000;

// --- Access patterns ---

#[derive(Debug, Clone, Copy)]
enum Pattern {
  // Every key fits; accesses only promote.
  Hit,
  // Keyspace is four times the capacity; most accesses evict.
  Churn,
}

fn key_for(pattern: Pattern, capacity: u64, thread: u64, op: u64) -> u64 {
  let span = match pattern {
    Pattern::Hit => capacity,
    Pattern::Churn => capacity * 4,
  };
  (op.wrapping_mul(2_654_435_761) ^ thread) % span
}

// --- Benchmark Functions ---

fn run_threads<V>(workload: Workload, pattern: Pattern, concurrency: usize, iters: u64, value: V) -> Duration
where
  V: writeback_cache::CacheValue + Default,
{
  let capacity = 1_024u64;
  let mut total = Duration::ZERO;

  for _ in 0..iters {
    let cache = Arc::new(
      CacheBuilder::<u64, V>::new()
        .capacity(capacity as usize)
        .workload(workload)
        .eviction_hook(NoopHook)
        .build()
        .unwrap(),
    );
    for key in 0..capacity {
      cache.access(key).unwrap();
    }

    let barrier = Arc::new(Barrier::new(concurrency + 1));
    let handles: Vec<_> = (0..concurrency as u64)
      .map(|t| {
        let cache = cache.clone();
        let barrier = barrier.clone();
        let value = value.clone();
        thread::spawn(move || {
          barrier.wait();
          for op in 0..OPS_PER_THREAD {
            let item = cache.access(key_for(pattern, capacity, t, op)).unwrap();
            if op % 4 == 0 {
              item.update(value.clone());
            } else {
              black_box(item.read());
            }
          }
        })
      })
      .collect();

    barrier.wait();
    let start = Instant::now();
    for handle in handles {
      handle.join().unwrap();
    }
    total += start.elapsed();
  }
  total
}

fn bench_access(c: &mut Criterion) {
  for pattern in [Pattern::Hit, Pattern::Churn] {
    let mut group = c.benchmark_group(format!("SyncAccess/{:?}", pattern));

    for concurrency in [1usize, 4, 8] {
      group.throughput(Throughput::Elements(OPS_PER_THREAD * concurrency as u64));

      group.bench_with_input(BenchmarkId::new("u64", concurrency), &concurrency, |b, &n| {
        b.iter_custom(|iters| run_threads(Workload::ReadHeavy, pattern, n, iters, 7u64))
      });

      for workload in [Workload::ReadHeavy, Workload::WriteHeavy] {
        let id = BenchmarkId::new(format!("String/{}", workload), concurrency);
        group.bench_with_input(id, &concurrency, |b, &n| {
          b.iter_custom(|iters| run_threads(workload, pattern, n, iters, "value".to_string()))
        });
      }
    }
    group.finish();
  }
}

criterion_group!(benches, bench_access);
criterion_main!(benches);
