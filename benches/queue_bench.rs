// Enqueue/dequeue performance benchmarks for blockheap

use blockheap::{Options, PriorityQueue};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tempfile::TempDir;

fn benchmark_sequential_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_enqueue");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut queue = PriorityQueue::open(temp_dir.path().join("queue.dat"), Options::default()).unwrap();

                for i in 0..size {
                    queue.enqueue(i).unwrap();
                }

                black_box(&queue);
            });
        });
    }

    group.finish();
}

fn benchmark_random_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_enqueue");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut queue =
                    PriorityQueue::open(temp_dir.path().join("queue.dat"), Options::new().capacity(256)).unwrap();

                use rand::Rng;
                let mut rng = rand::rng();

                for _ in 0..size {
                    queue.enqueue(rng.random()).unwrap();
                }

                black_box(&queue);
            });
        });
    }

    group.finish();
}

fn benchmark_enqueue_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_drain");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut queue =
                    PriorityQueue::open(temp_dir.path().join("queue.dat"), Options::new().capacity(256)).unwrap();

                for i in 0..size {
                    queue.enqueue(i * 7919 % 10007).unwrap();
                }
                while let Some(item) = queue.dequeue().unwrap() {
                    black_box(item);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sequential_enqueue,
    benchmark_random_enqueue,
    benchmark_enqueue_drain
);
criterion_main!(benches);
