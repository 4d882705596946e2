use criterion::{criterion_group, criterion_main, Criterion};
use soundseek_core::tokenizer::tokenize;
use soundseek_core::{RawDocument, SearchEngine, SearchOptions, StandardAnalyzer};

const WORDS: &[&str] = &[
    "index", "search", "phrase", "ranking", "cosine", "vector", "document", "query", "token", "stemming",
    "posting", "frequency", "length", "sound", "engine", "corpus", "matching", "weights", "inverse", "logarithm",
];

fn synthetic_text(seed: usize, len: usize) -> String {
    (0..len)
        .map(|i| WORDS[(seed * 31 + i * 7 + i / 3) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_tokenize(c: &mut Criterion) {
    let text = synthetic_text(1, 2_000);
    c.bench_function("tokenize_2k_words", |b| b.iter(|| tokenize(&text)));
}

fn bench_search(c: &mut Criterion) {
    let docs = (0..500).map(|i| RawDocument::new(format!("doc{i}.txt"), synthetic_text(i, 300)));
    let engine = SearchEngine::from_documents(docs, StandardAnalyzer, SearchOptions::default()).expect("build");
    c.bench_function("free_text_query", |b| b.iter(|| engine.search("cosine ranking of document vectors")));
    c.bench_function("phrase_query", |b| b.iter(|| engine.search("\"posting frequency\" sound")));
    c.bench_function("phonetic_fallback_query", |b| b.iter(|| engine.search("serch enjin")));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
