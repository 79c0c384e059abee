//! Benchmark: exact flat scan vs binary-quantized shortlist + rescore.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use twist::corpus::TwistExample;
use twist::embedding::SentenceEmbedder;
use twist::index::{BqIndex, FlatIndex, VectorIndex};

const SUBJECTS: &[&str] = &[
    "detective", "ghost", "captain", "robot", "queen", "doctor", "twin", "butler",
];
const PLACES: &[&str] = &[
    "manor", "starship", "village", "lighthouse", "hospital", "castle", "train",
];
const GENRES: &[&str] = &["mystery", "horror", "sci-fi", "fantasy", "thriller"];

fn synthetic_corpus(n: usize) -> Vec<TwistExample> {
    (0..n)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            let place = PLACES[(i / SUBJECTS.len()) % PLACES.len()];
            TwistExample {
                id: format!("bench_{i:05}"),
                genre: GENRES[i % GENRES.len()].to_string(),
                story_setup: format!("A {subject} arrives at the {place} on night {i}"),
                twist: format!("The {subject} never left the {place}"),
                tags: Vec::new(),
            }
        })
        .collect()
}

fn bench_index_query(c: &mut Criterion) {
    let embedder = SentenceEmbedder::stub();
    let query = embedder
        .embed("A ghost arrives at the lighthouse during a storm")
        .unwrap();

    let mut group = c.benchmark_group("index_query_top3");
    group.sample_size(30);

    for &size in &[1_000usize, 10_000] {
        let corpus = synthetic_corpus(size);
        let flat = FlatIndex::build(&corpus, &embedder).unwrap();
        let bq = BqIndex::build(&corpus, &embedder).unwrap();

        group.bench_with_input(BenchmarkId::new("flat", size), &size, |b, _| {
            b.iter(|| black_box(flat.query(black_box(&query), 3).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("bq", size), &size, |b, _| {
            b.iter(|| black_box(bq.query(black_box(&query), 3).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("flat_genre_filter", size), &size, |b, _| {
            b.iter(|| {
                black_box(
                    flat.query_filtered(black_box(&query), 3, &|e: &TwistExample| {
                        e.genre_matches("horror")
                    })
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_query);
criterion_main!(benches);
