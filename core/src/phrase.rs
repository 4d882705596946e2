use crate::index::{DocId, InvertedIndex, Posting, TermId};
use std::collections::BTreeSet;

/// Documents in which `tokens` occur as a contiguous run, in the given order.
///
/// An empty phrase, or one containing a token missing from the vocabulary,
/// matches nothing. Repeated tokens are checked position by position.
pub fn match_phrase<S: AsRef<str>>(tokens: &[S], index: &InvertedIndex) -> BTreeSet<DocId> {
    let Some(term_ids) = tokens
        .iter()
        .map(|t| index.term_id(t.as_ref()))
        .collect::<Option<Vec<TermId>>>()
    else {
        return BTreeSet::new();
    };
    if term_ids.is_empty() {
        return BTreeSet::new();
    }

    candidate_docs(&term_ids, index)
        .into_iter()
        .filter(|&doc_id| contains_run(&term_ids, doc_id, index))
        .collect()
}

/// Docs holding every term, intersecting from the rarest posting list.
fn candidate_docs(term_ids: &[TermId], index: &InvertedIndex) -> Vec<DocId> {
    let mut distinct = term_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.sort_by_key(|&tid| index.doc_freq(tid));

    let mut docs: Vec<DocId> = index.postings_for(distinct[0]).iter().map(|p| p.doc_id).collect();
    for &tid in &distinct[1..] {
        if docs.is_empty() {
            break;
        }
        docs = intersect(&docs, index.postings_for(tid));
    }
    docs
}

/// Linear merge of two doc-id sorted lists.
fn intersect(docs: &[DocId], postings: &[Posting]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < docs.len() && j < postings.len() {
        let (a, b) = (docs[i], postings[j].doc_id);
        if a == b {
            result.push(a);
            i += 1;
            j += 1;
        } else if a < b {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

fn contains_run(term_ids: &[TermId], doc_id: DocId, index: &InvertedIndex) -> bool {
    let Some(lists) = term_ids
        .iter()
        .map(|&tid| index.positions(tid, doc_id))
        .collect::<Option<Vec<&[u32]>>>()
    else {
        return false;
    };
    // one witness is enough
    lists[0].iter().any(|&start| {
        lists
            .iter()
            .enumerate()
            .skip(1)
            .all(|(offset, positions)| positions.binary_search(&(start + offset as u32)).is_ok())
    })
}
