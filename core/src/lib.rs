//! Positional inverted index with ltc/lnc cosine ranking, exact phrase
//! filtering and a phonetic fallback for misspelled query terms.

pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod phonetic;
pub mod phrase;
pub mod query;
pub mod scorer;
pub mod tokenizer;

pub use corpus::{load_corpus, RawDocument};
pub use engine::{Hit, SearchEngine, SearchOptions, SearchResults};
pub use error::{EngineError, Result};
pub use index::{BuildOptions, DocId, DocMeta, IndexBuilder, InvertedIndex, Posting, TermId};
pub use phrase::match_phrase;
pub use query::{vectorize, AnalyzedQuery, ParsedQuery, QueryVector, Substitution, Vectorizer};
pub use scorer::{rank, ScoredDoc};
pub use tokenizer::{tokenize, Analyzer, SimpleAnalyzer, StandardAnalyzer};
