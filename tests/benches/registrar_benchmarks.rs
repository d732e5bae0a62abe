//! # Registrar Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | sr-01 Zone-file codec | Greedy packing of a queue under the byte ceiling |
//! | sr-01 Zone-file codec | Chunking a registrant zone file |
//! | sr-02 Queue store | Enqueue and fetch of received records |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::testing::TEST_ADDRESSES;
use shared_types::{SubdomainOperation, UriEntry};
use sr_01_zonefile::{build_zonefile, destructure};
use sr_02_queue_store::{InMemoryQueueStore, QueueStore};

fn operations(count: usize, zonefile_len: usize) -> Vec<SubdomainOperation> {
    let zonefile = "x".repeat(zonefile_len);
    (0..count)
        .map(|i| {
            SubdomainOperation::new_registration(
                format!("name{}", i),
                TEST_ADDRESSES[i % TEST_ADDRESSES.len()],
                zonefile.clone(),
            )
        })
        .collect()
}

fn bench_zonefile_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-01-zonefile-packing");
    let uri = vec![UriEntry::http_service("https://registrar.example")];

    for queued in [10, 100, 1000] {
        let ops = operations(queued, 200);
        group.throughput(Throughput::Elements(queued as u64));
        group.bench_with_input(BenchmarkId::new("build_4096", queued), &ops, |b, ops| {
            b.iter(|| build_zonefile("id.stx", &uri, black_box(ops), 4096))
        });
    }
    group.finish();
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-01-zonefile-chunks");
    for len in [100, 1000, 4000] {
        let payload = "a".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("destructure", len), &payload, |b, payload| {
            b.iter(|| destructure(black_box(payload)))
        });
    }
    group.finish();
}

fn bench_queue_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-02-queue-store");
    let ops = operations(500, 100);

    group.bench_function("enqueue_then_fetch_500", |b| {
        b.iter(|| {
            let store = InMemoryQueueStore::new();
            for (i, op) in ops.iter().enumerate() {
                let _ = store.enqueue(op, i as u64);
            }
            black_box(store.fetch_received().map(|records| records.len()))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_zonefile_packing, bench_chunking, bench_queue_store);
criterion_main!(benches);
