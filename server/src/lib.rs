use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use soundseek_core::{DocId, SearchEngine, SearchOptions, StandardAnalyzer, Substitution};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub substitutions: Vec<Substitution>,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub name: String,
    pub score: f64,
    pub snippet: Option<String>,
}

pub struct ServerConfig {
    pub corpus: PathBuf,
    pub options: SearchOptions,
}

/// The index is immutable once built, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine<StandardAnalyzer>>,
    pub built_at: String,
}

pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let engine = SearchEngine::from_corpus_dir(&config.corpus, StandardAnalyzer, config.options)?;
    tracing::info!(
        corpus = %config.corpus.display(),
        num_docs = engine.index().num_docs(),
        num_terms = engine.index().vocabulary_len(),
        "index ready"
    );
    Ok(app_with_engine(engine))
}

pub fn app_with_engine(engine: SearchEngine<StandardAnalyzer>) -> Router {
    let built_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    let app_state = AppState { engine: Arc::new(engine), built_at };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .with_state(app_state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let any = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                any
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => any,
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let results = state.engine.search(&params.q);
    let total_hits = results.len();
    let k = params.k.clamp(1, 100);

    let highlighter = term_pattern(&params.q);
    let index = state.engine.index();
    let hits: Vec<SearchHit> = results
        .hits
        .into_iter()
        .take(k)
        .map(|hit| {
            let snippet = index
                .doc(hit.doc_id)
                .and_then(|meta| meta.text_path.as_deref())
                .and_then(|path| snippet_from_file(path, highlighter.as_ref()));
            SearchHit { doc_id: hit.doc_id, name: hit.name, score: hit.score, snippet }
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, took_ms = elapsed.as_millis() as u64, "search");
    Json(SearchResponse {
        query: params.q,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        substitutions: results.substitutions,
        results: hits,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let index = state.engine.index();
    let Some(meta) = index.doc(doc_id) else {
        return Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))));
    };
    let mut obj = serde_json::json!({
        "doc_id": doc_id,
        "name": meta.external_id,
        "length": index.doc_length(doc_id),
    });
    if let Some(path) = &meta.text_path {
        if let Ok(text) = std::fs::read_to_string(path) {
            obj["text"] = serde_json::Value::String(text);
        }
    }
    Ok(Json(obj))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let index = state.engine.index();
    Json(serde_json::json!({
        "documents": index.num_docs(),
        "scorable_documents": index.total_doc_count(),
        "vocabulary": index.vocabulary_len(),
        "phonetic_codes": index.phonetic_code_count(),
        "phonetic_fallback": state.engine.options().phonetic_fallback,
        "built_at": state.built_at,
    }))
}

/// Case-insensitive alternation of the raw query words, quotes stripped.
fn term_pattern(query: &str) -> Option<Regex> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return None;
    }
    RegexBuilder::new(&terms.join("|")).case_insensitive(true).build().ok()
}

fn snippet_from_file(path: &FsPath, pattern: Option<&Regex>) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    if text.is_empty() {
        return None;
    }
    let Some(pattern) = pattern else {
        return Some(text.chars().take(200).collect());
    };
    let snippet = match pattern.find(&text) {
        Some(m) => {
            let start = floor_boundary(&text, m.start().saturating_sub(100));
            let end = floor_boundary(&text, (m.start() + 200).min(text.len()));
            &text[start..end]
        }
        None => {
            let end = text.char_indices().nth(200).map_or(text.len(), |(i, _)| i);
            &text[..end]
        }
    };
    Some(pattern.replace_all(snippet, "<em>$0</em>").into_owned())
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_pattern_strips_quotes_and_punctuation() {
        let re = term_pattern("\"sat on\" mat!").unwrap();
        assert!(re.is_match("SAT"));
        assert!(re.is_match("Mat"));
        assert!(term_pattern("\"\" !!").is_none());
    }

    #[test]
    fn floor_boundary_never_splits_a_char() {
        let text = "aé";
        assert_eq!(floor_boundary(text, 2), 1);
        assert_eq!(floor_boundary(text, 3), 3);
    }
}
