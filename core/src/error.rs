use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures that prevent an index from being produced. Queries never fail.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("corpus folder `{0}` not found")]
    CorpusNotFound(PathBuf),

    #[error("failed to list corpus folder `{path}`: {source}")]
    CorpusScan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("index build exceeded its {limit:?} deadline after {elapsed:?}")]
    DeadlineExceeded { limit: Duration, elapsed: Duration },

    #[error("term `{term}` in document `{doc}` counted {count} times but has {positions} positions")]
    Inconsistent {
        term: String,
        doc: String,
        count: u32,
        positions: usize,
    },
}
