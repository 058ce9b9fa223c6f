use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

/// Shared handle to a record. One allocation is referenced from every index
/// the file lands in.
pub type RecordRef = Arc<FileRecord>;

/// Term -> (record -> occurrences of the term in that record)
pub type ContentIndex = FxHashMap<String, FxHashMap<RecordRef, u64>>;

/// Exact byte size -> records of that size, in merge order.
/// Ordered so size ranges can be answered with a range scan.
pub type SizeIndex = BTreeMap<u64, Vec<RecordRef>>;

/// Exact file name (with extension) -> records carrying that name
pub type NameIndex = FxHashMap<String, Vec<RecordRef>>;

/// Immutable metadata snapshot of one file, taken at crawl time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Milliseconds since the Unix epoch
    pub modified_at: u64,
    pub extension: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64, modified_at: u64) -> Self {
        let name = name.into();
        let extension = extension_of(&name).to_string();
        Self {
            name,
            path: path.into(),
            size_bytes,
            modified_at,
            extension,
        }
    }

    /// Build a record from a path and its (already fetched) metadata
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let modified_at = metadata
            .modified()
            .map(|t| t.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64)
            .unwrap_or(0);

        Self::new(name, path, metadata.len(), modified_at)
    }
}

/// Last non-empty `.`-separated segment of a file name.
/// A name without a usable segment is its own extension.
pub fn extension_of(name: &str) -> &str {
    name.rsplit('.').find(|s| !s.is_empty()).unwrap_or(name)
}

/// Configuration for an indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Worker threads executing (file, strategy) tasks. 0 means one per CPU.
    pub worker_threads: usize,
    /// Capacity of the task queue. Submission blocks while it is full.
    pub queue_capacity: usize,
    /// Overall deadline for a run, measured from the start of `index`
    pub deadline: Duration,
    /// Files above this size get no content entries
    pub max_content_bytes: u64,
    /// Follow symlinks while walking subdirectories
    pub follow_links: bool,
    /// Draw progress bars on the terminal
    pub show_progress: bool,
}

impl IndexConfig {
    /// Resolve `worker_threads`, mapping 0 to the available parallelism
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            queue_capacity: 1024,
            deadline: Duration::from_secs(60 * 60),
            max_content_bytes: 100 * 1024 * 1024,
            follow_links: false,
            show_progress: false,
        }
    }
}
