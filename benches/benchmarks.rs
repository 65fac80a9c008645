use bookshelf::{Collection, DefaultBackend, Document, FlushPolicy};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Duration;

fn bench_path(name: &str, size: usize) -> PathBuf {
    std::env::temp_dir().join(format!("bookshelf_bench_{}_{}.json", name, size))
}

fn book(i: usize) -> Document {
    json!({"title": format!("Book {i}"), "author": "Anon", "pages": i})
        .as_object()
        .cloned()
        .unwrap()
}

fn bench_create_find_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_find_remove");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("manual", size), &size, |b, &size| {
            let path = bench_path("cfr", size);
            let _ = std::fs::remove_file(&path);
            let books =
                Collection::<DefaultBackend>::open_with_policy(&path, "books", FlushPolicy::Manual)
                    .unwrap();
            b.iter(|| {
                let ids: Vec<String> = (0..size)
                    .map(|i| books.create(book(i)).unwrap()["id"].as_str().unwrap().to_owned())
                    .collect();
                for id in &ids {
                    black_box(books.find(id));
                }
                for id in &ids {
                    books.remove(id).unwrap();
                }
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    for size in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("ordered", size), &size, |b, &size| {
            let path = bench_path("list", size);
            let _ = std::fs::remove_file(&path);
            let books =
                Collection::<DefaultBackend>::open_with_policy(&path, "books", FlushPolicy::Manual)
                    .unwrap();
            for i in 0..size {
                books.create(book(i)).unwrap();
            }
            b.iter(|| black_box(books.all()));
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(8));
    for size in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("compact", size), &size, |b, &size| {
            let path = bench_path("flush", size);
            let _ = std::fs::remove_file(&path);
            let books =
                Collection::<DefaultBackend>::open_with_policy(&path, "books", FlushPolicy::Manual)
                    .unwrap();
            for i in 0..size {
                books.create(book(i)).unwrap();
            }
            b.iter(|| books.flush().unwrap());
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("manual", size), &size, |b, &size| {
            let path = bench_path("assign", size);
            let _ = std::fs::remove_file(&path);
            let books =
                Collection::<DefaultBackend>::open_with_policy(&path, "books", FlushPolicy::Manual)
                    .unwrap();
            let ids: Vec<String> = (0..size)
                .map(|i| books.create(book(i)).unwrap()["id"].as_str().unwrap().to_owned())
                .collect();
            let patch = json!({"author": "Someone"}).as_object().cloned().unwrap();
            b.iter(|| {
                for id in &ids {
                    books.assign(id, patch.clone()).unwrap();
                }
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

criterion_group!(
    benches,
    bench_create_find_remove,
    bench_list,
    bench_flush,
    bench_assign,
);
criterion_main!(benches);
