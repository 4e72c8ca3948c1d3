use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use search_index::{InMemorySearchIndex, Meow, SearchIndex};

const WORDS: &[&str] = &[
    "nap", "tuna", "box", "laser", "yarn", "window", "bird", "sunbeam", "purr", "zoomies",
];

fn body_for(i: usize) -> String {
    (0..8)
        .map(|k| WORDS[(i * 7 + k * 3) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

async fn populate_index(index: &InMemorySearchIndex, n: usize) {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..n {
        let meow = Meow::new(
            format!("m{i:06}"),
            body_for(i),
            base + Duration::seconds(i as i64),
        );
        index.upsert(&meow).await.unwrap();
    }
}

fn bench_upsert_1000(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("search_index/upsert_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                let index = InMemorySearchIndex::new();
                populate_index(&index, 1000).await;
            });
        });
    });
}

fn bench_query_10000_docs(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let index = InMemorySearchIndex::new();
    rt.block_on(populate_index(&index, 10_000));

    c.bench_function("search_index/query_10000_docs", |b| {
        b.iter(|| {
            rt.block_on(async {
                index.query("tuna laser", 0, 100).await.unwrap();
            });
        });
    });
}

fn bench_reupsert_same_id(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let index = InMemorySearchIndex::new();
    rt.block_on(populate_index(&index, 1000));
    let meow = Meow::new("m000500", body_for(500), Utc::now());

    c.bench_function("search_index/reupsert_same_id", |b| {
        b.iter(|| {
            rt.block_on(async {
                index.upsert(&meow).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_upsert_1000,
    bench_query_10000_docs,
    bench_reupsert_same_id
);
criterion_main!(benches);
