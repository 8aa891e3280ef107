use corelib::{translate, ChunkRecord, SplitKey};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

fn layout(chunks: usize) -> Vec<ChunkRecord> {
    let edge = |i: usize| -> serde_json::Value {
        if i == 0 {
            json!({"a": {"$minKey": 1}, "b": {"$minKey": 1}})
        } else if i == chunks {
            json!({"a": {"$maxKey": 1}, "b": {"$maxKey": 1}})
        } else {
            json!({"a": i / 4, "b": format!("k{:06}", i)})
        }
    };
    (0..chunks)
        .map(|i| {
            let min = edge(i).as_object().cloned().unwrap_or_default();
            let max = edge(i + 1).as_object().cloned().unwrap_or_default();
            ChunkRecord::new(min, max)
        })
        .collect()
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for chunks in [16usize, 1024, 16_384] {
        let input = layout(chunks);
        for split in ["a", "a,b"] {
            let key: SplitKey = split.parse().unwrap();
            group.bench_with_input(BenchmarkId::new(split, chunks), &input, |b, input| {
                b.iter(|| translate(black_box(input), &key))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
