use crate::index::{log_tf, DocId, InvertedIndex};
use crate::query::QueryVector;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Cosine ranking of an ltc query vector against lnc document vectors.
///
/// Candidates are the documents holding any query term, narrowed to
/// `phrase_filter` when given. Zero scores are dropped; the result is ordered
/// by descending score, then ascending external document id.
pub fn rank(query: &QueryVector, phrase_filter: Option<&BTreeSet<DocId>>, index: &InvertedIndex) -> Vec<ScoredDoc> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut candidates: HashSet<DocId> = HashSet::new();
    for (term_id, _) in query.iter() {
        candidates.extend(index.postings_for(term_id).iter().map(|p| p.doc_id));
    }
    if let Some(filter) = phrase_filter {
        candidates.retain(|doc_id| filter.contains(doc_id));
    }

    let mut scored: Vec<ScoredDoc> = candidates
        .into_iter()
        .filter_map(|doc_id| {
            let length = index.doc_length(doc_id);
            if length <= 0.0 {
                return None;
            }
            let score: f64 = query
                .iter()
                .map(|(term_id, q_w)| q_w * (log_tf(index.term_count(doc_id, term_id)) / length))
                .sum();
            (score > 0.0).then_some(ScoredDoc { doc_id, score })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| external_id(index, a.doc_id).cmp(external_id(index, b.doc_id)))
    });
    scored
}

fn external_id(index: &InvertedIndex, doc_id: DocId) -> &str {
    index.doc(doc_id).map(|m| m.external_id.as_str()).unwrap_or_default()
}
