use crate::corpus::{load_corpus, RawDocument};
use crate::error::Result;
use crate::index::{BuildOptions, DocId, DocMeta, IndexBuilder, InvertedIndex};
use crate::phrase::match_phrase;
use crate::query::{AnalyzedQuery, ParsedQuery, Substitution, Vectorizer};
use crate::scorer::rank;
use crate::tokenizer::{Analyzer, StandardAnalyzer};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Replace out-of-vocabulary query terms with a similar-sounding indexed term.
    pub phonetic_fallback: bool,
    pub build_timeout: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self { Self { phonetic_fallback: true, build_timeout: None } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    pub substitutions: Vec<Substitution>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool { self.hits.is_empty() }
    pub fn len(&self) -> usize { self.hits.len() }
}

/// An immutable index paired with the analyzer it was built with.
pub struct SearchEngine<A = StandardAnalyzer> {
    index: InvertedIndex,
    analyzer: A,
    options: SearchOptions,
}

impl<A: Analyzer> SearchEngine<A> {
    /// Analyze and index `docs` in one batch. Fails only if the build deadline passes.
    pub fn from_documents<I>(docs: I, analyzer: A, options: SearchOptions) -> Result<Self>
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let mut builder = IndexBuilder::with_options(BuildOptions { deadline: options.build_timeout });
        for doc in docs {
            let tokens = analyzer.analyze(&doc.text);
            let meta = DocMeta { external_id: doc.id, text_path: doc.path };
            builder.add_document(meta, tokens)?;
        }
        let index = builder.finish()?;
        Ok(Self { index, analyzer, options })
    }

    pub fn from_corpus_dir<P: AsRef<Path>>(dir: P, analyzer: A, options: SearchOptions) -> Result<Self> {
        let docs = load_corpus(dir)?;
        Self::from_documents(docs, analyzer, options)
    }

    /// Wrap an index built elsewhere; `analyzer` must match the one that produced its tokens.
    pub fn from_index(index: InvertedIndex, analyzer: A, options: SearchOptions) -> Self {
        Self { index, analyzer, options }
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn analyzer(&self) -> &A { &self.analyzer }

    pub fn options(&self) -> &SearchOptions { &self.options }

    pub fn analyze_query(&self, raw: &str) -> AnalyzedQuery {
        ParsedQuery::parse(raw).analyze(&self.analyzer)
    }

    pub fn search(&self, raw: &str) -> SearchResults {
        self.search_analyzed(&self.analyze_query(raw))
    }

    /// Every phrase must match; all free and phrase tokens contribute to the ranking.
    pub fn search_analyzed(&self, query: &AnalyzedQuery) -> SearchResults {
        let total = self.index.total_doc_count();
        if total == 0 {
            return SearchResults::default();
        }

        let mut phrase_filter: Option<BTreeSet<DocId>> = None;
        for phrase in &query.phrases {
            let matched = match_phrase(phrase, &self.index);
            phrase_filter = Some(match phrase_filter {
                None => matched,
                Some(acc) => acc.intersection(&matched).copied().collect(),
            });
        }
        if phrase_filter.as_ref().is_some_and(BTreeSet::is_empty) {
            return SearchResults::default();
        }

        let vector = Vectorizer::new(&self.index)
            .phonetic_fallback(self.options.phonetic_fallback)
            .vectorize(&query.all_tokens(), total);
        let hits: Vec<Hit> = rank(&vector, phrase_filter.as_ref(), &self.index)
            .into_iter()
            .map(|scored| Hit {
                doc_id: scored.doc_id,
                name: self.index.doc(scored.doc_id).map(|m| m.external_id.clone()).unwrap_or_default(),
                score: scored.score,
            })
            .collect();
        tracing::debug!(hits = hits.len(), terms = vector.len(), "query ranked");

        SearchResults { hits, substitutions: vector.substitutions().to_vec() }
    }
}
