use crate::index::{log_tf, InvertedIndex, TermId};
use crate::phonetic;
use crate::tokenizer::Analyzer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    static ref PHRASE_RE: Regex = Regex::new(r#""([^"]+)""#).expect("valid regex");
}

/// Raw query split into un-quoted spans and `"quoted phrases"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub free_text: Vec<String>,
    pub phrases: Vec<String>,
}

impl ParsedQuery {
    pub fn parse(raw: &str) -> Self {
        let mut parsed = Self::default();
        let mut last = 0;
        for caps in PHRASE_RE.captures_iter(raw) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else { continue };
            parsed.push_free(&raw[last..whole.start()]);
            parsed.phrases.push(inner.as_str().to_string());
            last = whole.end();
        }
        parsed.push_free(&raw[last..]);
        parsed
    }

    fn push_free(&mut self, span: &str) {
        let span = span.trim();
        if !span.is_empty() {
            self.free_text.push(span.to_string());
        }
    }

    pub fn analyze<A: Analyzer + ?Sized>(&self, analyzer: &A) -> AnalyzedQuery {
        AnalyzedQuery {
            free: self.free_text.iter().map(|s| analyzer.analyze(s)).collect(),
            phrases: self.phrases.iter().map(|p| analyzer.analyze(p)).collect(),
        }
    }
}

/// Query tokens after normalization, one list per span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzedQuery {
    pub free: Vec<Vec<String>>,
    pub phrases: Vec<Vec<String>>,
}

impl AnalyzedQuery {
    /// Free tokens followed by every phrase token; the multiset the query vector is built from.
    pub fn all_tokens(&self) -> Vec<&str> {
        self.free
            .iter()
            .chain(self.phrases.iter())
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// An out-of-vocabulary query token replaced by a similar-sounding indexed term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub replacement: String,
}

/// Unit-length ltc query vector keyed by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: BTreeMap<TermId, f64>,
    substitutions: Vec<Substitution>,
}

impl QueryVector {
    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn weight(&self, term_id: TermId) -> f64 { self.weights.get(&term_id).copied().unwrap_or(0.0) }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.weights.iter().map(|(&t, &w)| (t, w))
    }

    pub fn substitutions(&self) -> &[Substitution] { &self.substitutions }
}

pub struct Vectorizer<'a> {
    index: &'a InvertedIndex,
    phonetic_fallback: bool,
}

impl<'a> Vectorizer<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self { Self { index, phonetic_fallback: true } }

    pub fn phonetic_fallback(mut self, enabled: bool) -> Self {
        self.phonetic_fallback = enabled;
        self
    }

    /// Weight each distinct token by `(1 + log10(c)) * log10(N / df)` and L2-normalize.
    ///
    /// Tokens absent from the index fall back to the highest-df term sharing
    /// their phonetic code. A query with nothing matchable yields an empty vector.
    pub fn vectorize<S: AsRef<str>>(&self, tokens: &[S], total_doc_count: usize) -> QueryVector {
        if total_doc_count == 0 {
            return QueryVector::default();
        }

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.as_ref()).or_insert(0) += 1;
        }

        let mut vector = QueryVector::default();
        for (token, count) in counts {
            let term_id = match self.index.term_id(token).filter(|&t| self.index.doc_freq(t) > 0) {
                Some(tid) => tid,
                None if self.phonetic_fallback => match self.substitute(token) {
                    Some(tid) => {
                        let replacement = self.index.term(tid).unwrap_or_default().to_string();
                        tracing::debug!(original = token, %replacement, "phonetic substitution");
                        vector.substitutions.push(Substitution { original: token.to_string(), replacement });
                        tid
                    }
                    None => continue,
                },
                None => continue,
            };

            let df = self.index.doc_freq(term_id);
            if df == 0 {
                continue;
            }
            // weights stay non-negative even if N undercounts df
            let idf = (total_doc_count as f64 / df as f64).log10().max(0.0);
            *vector.weights.entry(term_id).or_insert(0.0) += log_tf(count) * idf;
        }

        let norm = vector.weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return QueryVector::default();
        }
        for w in vector.weights.values_mut() {
            *w /= norm;
        }
        vector
    }

    /// Highest-df vocabulary term sharing the token's phonetic code; ties go to the smaller term.
    fn substitute(&self, token: &str) -> Option<TermId> {
        let code = phonetic::encode(token);
        let mut best: Option<(TermId, usize)> = None;
        for &tid in self.index.phonetic_candidates(&code) {
            let df = self.index.doc_freq(tid);
            if df > 0 && best.map_or(true, |(_, best_df)| df > best_df) {
                best = Some((tid, df));
            }
        }
        best.map(|(tid, _)| tid)
    }
}

/// Build the query vector with phonetic fallback enabled.
pub fn vectorize<S: AsRef<str>>(tokens: &[S], total_doc_count: usize, index: &InvertedIndex) -> QueryVector {
    Vectorizer::new(index).vectorize(tokens, total_doc_count)
}
