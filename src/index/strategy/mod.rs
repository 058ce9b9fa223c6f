//! Indexing strategies.
//!
//! A strategy turns one file into a [`PartialIndex`] scoped to that file.
//! Strategies hold no per-file state, so the orchestrator can run any number
//! of them concurrently, including several strategies on the same file. The
//! orchestrator merges each partial index into the shared
//! [`IndexStore`](crate::index::IndexStore).
//!
//! - [`ContentStrategy`] - term frequencies from the file's text
//! - [`SizeStrategy`] - exact byte size
//! - [`NameStrategy`] - exact file name

mod content;
mod name;
mod size;

pub use content::ContentStrategy;
pub use name::NameStrategy;
pub use size::SizeStrategy;

use crate::index::pool::CancellationFlag;
use crate::index::types::{ContentIndex, IndexConfig, NameIndex, RecordRef, SizeIndex};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Per-file, per-strategy result awaiting a merge
#[derive(Debug, Clone)]
pub enum PartialIndex {
    Content(ContentIndex),
    Size(SizeIndex),
    Name(NameIndex),
}

impl PartialIndex {
    /// Number of keys (terms, sizes or names) in the partial index
    pub fn len(&self) -> usize {
        match self {
            PartialIndex::Content(index) => index.len(),
            PartialIndex::Size(index) => index.len(),
            PartialIndex::Name(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Common capability of every strategy: (file, record) -> partial index
pub trait IndexingStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Build the partial index for one file.
    ///
    /// Long-running strategies should poll `cancel` and give up early once
    /// it is set.
    fn build(&self, path: &Path, record: &RecordRef, cancel: &CancellationFlag) -> Result<PartialIndex>;
}

/// The content, size and name strategies, in that order
pub fn default_strategies(config: &IndexConfig) -> Vec<Arc<dyn IndexingStrategy>> {
    vec![
        Arc::new(ContentStrategy::new(config.max_content_bytes)),
        Arc::new(SizeStrategy),
        Arc::new(NameStrategy),
    ]
}
