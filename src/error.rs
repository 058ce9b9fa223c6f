//! Error types for indexing and search.
//!
//! Only crawl-level preconditions surface as [`IndexError`]. Failures while
//! reading a single file inside a strategy are logged and dropped by the
//! worker, and deadline expiry is reported through
//! [`IndexReport::timed_out`](crate::index::IndexReport) rather than as an
//! error.

use std::io;
use std::path::PathBuf;

/// Fatal errors raised by [`Indexer::index`](crate::index::Indexer::index).
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The root directory has no top-level entries.
    #[error("Provided dataset is empty: {}", path.display())]
    DatasetEmpty { path: PathBuf },

    /// The root directory could not be listed at all.
    #[error("Cannot read dataset root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker threads could not be started.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Errors returned by [`QueryExecutor::search`](crate::query::QueryExecutor::search).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A criteria field that is accepted in the payload but has no
    /// evaluation semantics.
    #[error("Unsupported search filter: {0}")]
    UnsupportedFilter(&'static str),
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
pub type SearchResult<T> = std::result::Result<T, SearchError>;
