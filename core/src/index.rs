//! Positional inverted index.
//!
//! Built once from a finite document set by [`IndexBuilder`], then read-only.
//! Terms and documents are interned to dense `u32` ids; the external document
//! identifier lives in [`DocMeta`].

use crate::error::{EngineError, Result};
use crate::phonetic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    /// Source file of the document text, used for snippet extraction.
    pub text_path: Option<PathBuf>,
}

impl DocMeta {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self { external_id: external_id.into(), text_path: None }
    }

    pub fn with_text_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.text_path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>, // strictly increasing
}

#[derive(Debug)]
struct DocEntry {
    meta: DocMeta,
    term_counts: HashMap<TermId, u32>,
    length: f64,
}

#[derive(Debug, Default)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    postings: Vec<Vec<Posting>>, // by term id, sorted by doc_id
    docs: Vec<DocEntry>,
    doc_ids: HashMap<String, DocId>,
    phonetic: HashMap<String, Vec<TermId>>, // candidates sorted by term text
    scorable_docs: usize,
}

/// Log-scaled term frequency `1 + log10(count)`, zero for an absent term.
pub(crate) fn log_tf(count: u32) -> f64 {
    if count == 0 { 0.0 } else { 1.0 + f64::from(count).log10() }
}

impl InvertedIndex {
    /// Build an index from `(doc_id, tokens)` pairs with default options.
    pub fn build<I, S, T>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut builder = IndexBuilder::new();
        for (id, tokens) in documents {
            builder.add_document(DocMeta::new(id), tokens)?;
        }
        builder.finish()
    }

    /// Number of recorded documents, including ones that produced no tokens.
    pub fn num_docs(&self) -> usize { self.docs.len() }

    /// Number of documents holding at least one token; the `N` of the idf term.
    pub fn total_doc_count(&self) -> usize { self.scorable_docs }

    pub fn vocabulary_len(&self) -> usize { self.terms.len() }

    pub fn phonetic_code_count(&self) -> usize { self.phonetic.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn term(&self, term_id: TermId) -> Option<&str> {
        self.terms.get(term_id as usize).map(String::as_str)
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    /// Postings for a term, sorted by doc id. Empty for an unknown term.
    pub fn postings_for(&self, term_id: TermId) -> &[Posting] {
        self.postings.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.term_id(term).map(|tid| self.postings_for(tid)).unwrap_or(&[])
    }

    pub fn positions(&self, term_id: TermId, doc_id: DocId) -> Option<&[u32]> {
        let plist = self.postings_for(term_id);
        plist
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|i| plist[i].positions.as_slice())
    }

    pub fn doc_freq(&self, term_id: TermId) -> usize { self.postings_for(term_id).len() }

    pub fn term_count(&self, doc_id: DocId, term_id: TermId) -> u32 {
        self.docs
            .get(doc_id as usize)
            .and_then(|d| d.term_counts.get(&term_id).copied())
            .unwrap_or(0)
    }

    /// Euclidean norm of the document's `1 + log10(tf)` vector; zero for an empty document.
    pub fn doc_length(&self, doc_id: DocId) -> f64 {
        self.docs.get(doc_id as usize).map(|d| d.length).unwrap_or(0.0)
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id as usize).map(|d| &d.meta)
    }

    pub fn doc_id(&self, external_id: &str) -> Option<DocId> { self.doc_ids.get(external_id).copied() }

    pub fn docs(&self) -> impl Iterator<Item = (DocId, &DocMeta)> + '_ {
        self.docs.iter().enumerate().map(|(i, d)| (i as DocId, &d.meta))
    }

    /// Vocabulary terms sharing a phonetic code, in term order.
    pub fn phonetic_candidates(&self, code: &str) -> &[TermId] {
        self.phonetic.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    fn verify(&self) -> Result<()> {
        for (term_id, plist) in self.postings.iter().enumerate() {
            for posting in plist {
                let count = self.term_count(posting.doc_id, term_id as TermId);
                let ascending = posting.positions.windows(2).all(|w| w[0] < w[1]);
                if count as usize != posting.positions.len() || !ascending {
                    return Err(EngineError::Inconsistent {
                        term: self.terms[term_id].clone(),
                        doc: self.docs[posting.doc_id as usize].meta.external_id.clone(),
                        count,
                        positions: posting.positions.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Upper bound on the whole build pass. Exceeding it discards the partial index.
    pub deadline: Option<Duration>,
}

/// Single-pass batch builder. Consumed by [`IndexBuilder::finish`].
pub struct IndexBuilder {
    index: InvertedIndex,
    started: Instant,
    deadline: Option<Duration>,
}

impl Default for IndexBuilder {
    fn default() -> Self { Self::new() }
}

impl IndexBuilder {
    pub fn new() -> Self { Self::with_options(BuildOptions::default()) }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { index: InvertedIndex::default(), started: Instant::now(), deadline: options.deadline }
    }

    /// Record one document. Returns `None` when the external id was already indexed.
    pub fn add_document<I>(&mut self, meta: DocMeta, tokens: I) -> Result<Option<DocId>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.check_deadline()?;
        if self.index.doc_ids.contains_key(&meta.external_id) {
            tracing::warn!(doc = %meta.external_id, "duplicate document id, skipping");
            return Ok(None);
        }

        let doc_id = self.index.docs.len() as DocId;
        let mut term_counts: HashMap<TermId, u32> = HashMap::new();
        for (pos, token) in tokens.into_iter().enumerate() {
            let tid = self.intern(token.as_ref());
            let plist = &mut self.index.postings[tid as usize];
            match plist.last_mut() {
                Some(p) if p.doc_id == doc_id => p.positions.push(pos as u32),
                _ => plist.push(Posting { doc_id, positions: vec![pos as u32] }),
            }
            *term_counts.entry(tid).or_insert(0) += 1;
        }

        self.index.doc_ids.insert(meta.external_id.clone(), doc_id);
        self.index.docs.push(DocEntry { meta, term_counts, length: 0.0 });
        Ok(Some(doc_id))
    }

    pub fn finish(mut self) -> Result<InvertedIndex> {
        self.check_deadline()?;

        // Phonetic map over the frozen vocabulary
        let terms = &self.index.terms;
        let codes = &mut self.index.phonetic;
        for (tid, term) in terms.iter().enumerate() {
            codes.entry(phonetic::encode(term)).or_default().push(tid as TermId);
        }
        for candidates in codes.values_mut() {
            candidates.sort_by(|a, b| terms[*a as usize].cmp(&terms[*b as usize]));
        }
        self.check_deadline()?;

        for doc in self.index.docs.iter_mut() {
            // summed in ascending order so equal count profiles give bit-identical lengths
            let mut squares: Vec<f64> = doc.term_counts.values().map(|&c| log_tf(c).powi(2)).collect();
            squares.sort_by(f64::total_cmp);
            doc.length = squares.iter().sum::<f64>().sqrt();
        }
        self.index.scorable_docs = self.index.docs.iter().filter(|d| !d.term_counts.is_empty()).count();

        self.index.verify()?;
        self.check_deadline()?;

        tracing::info!(
            num_docs = self.index.num_docs(),
            scorable_docs = self.index.scorable_docs,
            num_terms = self.index.vocabulary_len(),
            phonetic_codes = self.index.phonetic.len(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "index build complete"
        );
        Ok(self.index)
    }

    fn intern(&mut self, token: &str) -> TermId {
        if let Some(&tid) = self.index.dictionary.get(token) {
            return tid;
        }
        let tid = self.index.terms.len() as TermId;
        self.index.dictionary.insert(token.to_string(), tid);
        self.index.terms.push(token.to_string());
        self.index.postings.push(Vec::new());
        tid
    }

    fn check_deadline(&self) -> Result<()> {
        if let Some(limit) = self.deadline {
            let elapsed = self.started.elapsed();
            if elapsed >= limit {
                return Err(EngineError::DeadlineExceeded { limit, elapsed });
            }
        }
        Ok(())
    }
}
