use criterion::{criterion_group, criterion_main, Criterion};
use wordex_core::tokenizer::tokenize;
use wordex_core::{InvertedIndex, MemorySource};

fn sample_text() -> String {
    let words = ["index", "search", "cat,", "dog.", "where?", "the", "a", "document"];
    (0..5_000).map(|i| words[i % words.len()]).collect::<Vec<_>>().join(" ")
}

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("tokenize_5k_words", |b| b.iter(|| tokenize(&text)));
}

fn bench_index_document(c: &mut Criterion) {
    let src = MemorySource::new();
    src.insert("sample", sample_text());
    let index = InvertedIndex::with_source(src);
    c.bench_function("index_document_5k_words", |b| b.iter(|| index.index_document("sample").unwrap()));
}

criterion_group!(benches, bench_tokenize, bench_index_document);
criterion_main!(benches);
