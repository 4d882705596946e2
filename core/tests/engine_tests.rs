use soundseek_core::{
    AnalyzedQuery, EngineError, RawDocument, SearchEngine, SearchOptions, SimpleAnalyzer, StandardAnalyzer,
};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn engine(docs: &[(&str, &str)]) -> SearchEngine<SimpleAnalyzer> {
    let docs = docs.iter().map(|(id, text)| RawDocument::new(*id, *text));
    SearchEngine::from_documents(docs, SimpleAnalyzer, SearchOptions::default()).unwrap()
}

fn names(engine: &SearchEngine<SimpleAnalyzer>, query: &str) -> Vec<String> {
    engine.search(query).hits.into_iter().map(|h| h.name).collect()
}

fn cat_dog() -> SearchEngine<SimpleAnalyzer> {
    engine(&[
        ("doc1", "the cat sat on the mat"),
        ("doc2", "the dog sat on the log"),
        ("doc3", "birds fly south"),
    ])
}

#[test]
fn free_text_ranks_by_shared_terms() {
    let engine = cat_dog();
    let results = engine.search("cat sat");
    assert_eq!(results.len(), 2);
    assert_eq!(results.hits[0].name, "doc1");
    assert_eq!(results.hits[1].name, "doc2");
    assert!(results.hits[0].score > results.hits[1].score);
    assert!(results.hits[1].score > 0.0);
}

#[test]
fn quoted_phrase_matches_both_documents_equally() {
    let engine = cat_dog();
    let results = engine.search("\"sat on\"");
    assert_eq!(results.len(), 2);
    assert_eq!(results.hits[0].score, results.hits[1].score);
    assert_eq!(names(&engine, "\"sat on\""), vec!["doc1", "doc2"]);
}

#[test]
fn phrase_combined_with_free_text_differentiates() {
    let engine = cat_dog();
    assert_eq!(names(&engine, "\"sat on\" dog"), vec!["doc2", "doc1"]);
    assert_eq!(names(&engine, "\"on the mat\" dog"), vec!["doc1"]);
}

#[test]
fn every_phrase_must_match() {
    let engine = cat_dog();
    assert!(engine.search("\"the cat\" \"the dog\"").is_empty());
    assert!(engine.search("\"mat the\"").is_empty());
}

#[test]
fn phrase_analyzing_to_nothing_matches_nothing() {
    let engine = cat_dog();
    assert!(engine.search("cat \"!!!\"").is_empty());
}

#[test]
fn misspelled_term_uses_phonetic_fallback() {
    let engine = engine(&[("a", "john smith wrote this"), ("b", "mary jones wrote that")]);
    let exact = engine.search_analyzed(&AnalyzedQuery { free: vec![vec!["smyth".into()]], phrases: vec![] });
    assert_eq!(exact.hits.len(), 1);
    assert_eq!(exact.hits[0].name, "a");
    assert_eq!(exact.substitutions[0].replacement, "smith");

    let strict = SearchEngine::from_documents(
        vec![RawDocument::new("a", "john smith wrote this"), RawDocument::new("b", "mary jones wrote that")],
        SimpleAnalyzer,
        SearchOptions { phonetic_fallback: false, ..SearchOptions::default() },
    )
    .unwrap();
    assert!(strict.search("smyth").is_empty());
}

#[test]
fn unmatched_and_empty_queries_return_no_results() {
    let engine = cat_dog();
    assert!(engine.search("").is_empty());
    assert!(engine.search("   \"\" ").is_empty());
    assert!(engine.search("xylophone").is_empty());
    assert!(engine.search("\"unterminated").is_empty());
}

#[test]
fn empty_corpus_returns_empty_results() {
    let engine = engine(&[]);
    assert_eq!(engine.index().num_docs(), 0);
    assert!(engine.search("anything at all").is_empty());
    assert!(engine.search("\"a phrase\"").is_empty());
}

#[test]
fn corpus_of_empty_documents_returns_empty_results() {
    let engine = SearchEngine::from_documents(
        vec![RawDocument::new("blank", "the of and")],
        StandardAnalyzer,
        SearchOptions::default(),
    )
    .unwrap();
    assert_eq!(engine.index().num_docs(), 1);
    assert_eq!(engine.index().total_doc_count(), 0);
    assert!(engine.search("the").is_empty());
}

#[test]
fn results_are_deterministic() {
    let docs = [("e.txt", "red green"), ("a.txt", "red green"), ("c.txt", "green blue"), ("b.txt", "yellow")];
    let first = engine(&docs).search("red green blue");
    for _ in 0..5 {
        assert_eq!(engine(&docs).search("red green blue"), first);
    }
    let order: Vec<&str> = first.hits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(order, vec!["c.txt", "a.txt", "e.txt"]);
}

#[test]
fn builds_from_corpus_folder_with_stemming() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cats.txt"), "Cats were sitting on mats.").unwrap();
    fs::write(dir.path().join("dogs.txt"), "A dog sits on a log.").unwrap();
    fs::write(dir.path().join("fish.txt"), "Fish swim.").unwrap();
    let engine = SearchEngine::from_corpus_dir(dir.path(), StandardAnalyzer, SearchOptions::default()).unwrap();

    let results = engine.search("cat");
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.hits[0].name, "cats.txt");
    let meta = engine.index().doc(results.hits[0].doc_id).unwrap();
    assert_eq!(meta.text_path.as_deref(), Some(dir.path().join("cats.txt").as_path()));
}

#[test]
fn missing_corpus_folder_fails_the_build() {
    let dir = tempdir().unwrap();
    let result = SearchEngine::from_corpus_dir(dir.path().join("missing"), StandardAnalyzer, SearchOptions::default());
    assert!(matches!(result, Err(EngineError::CorpusNotFound(_))));
}

#[test]
fn build_deadline_reports_failure() {
    let options = SearchOptions { build_timeout: Some(Duration::ZERO), ..SearchOptions::default() };
    let result = SearchEngine::from_documents(vec![RawDocument::new("a", "text")], SimpleAnalyzer, options);
    assert!(matches!(result, Err(EngineError::DeadlineExceeded { .. })));
}

#[test]
fn hits_serialize_to_json() {
    let engine = cat_dog();
    let json = serde_json::to_value(engine.search("cat")).unwrap();
    assert_eq!(json["hits"][0]["name"], "doc1");
    assert!(json["substitutions"].as_array().unwrap().is_empty());
}
