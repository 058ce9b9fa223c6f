use super::{IndexingStrategy, PartialIndex};
use crate::index::pool::CancellationFlag;
use crate::index::types::{ContentIndex, RecordRef};
use crate::utils::extract_terms;
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Counts term occurrences in a file's text.
///
/// The file is streamed line by line, so memory stays bounded by the longest
/// line rather than the file size. Any read or UTF-8 decode error discards
/// the whole partial index: a file either contributes all of its terms or
/// none of them.
#[derive(Debug, Clone)]
pub struct ContentStrategy {
    max_bytes: u64,
}

impl ContentStrategy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl IndexingStrategy for ContentStrategy {
    fn name(&self) -> &'static str {
        "content"
    }

    fn build(&self, path: &Path, record: &RecordRef, cancel: &CancellationFlag) -> Result<PartialIndex> {
        if record.size_bytes > self.max_bytes {
            tracing::debug!(
                path = %path.display(),
                size = record.size_bytes,
                limit = self.max_bytes,
                "Skipping content of oversized file"
            );
            return Ok(PartialIndex::Content(ContentIndex::default()));
        }

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut counts: FxHashMap<String, u64> = FxHashMap::default();
        for (line_no, line) in reader.lines().enumerate() {
            if cancel.is_cancelled() {
                bail!("Content indexing of {} cancelled", path.display());
            }
            let line = line.with_context(|| {
                format!("Failed to read line {} of {}", line_no + 1, path.display())
            })?;
            for term in extract_terms(&line) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }

        let local: ContentIndex = counts
            .into_iter()
            .map(|(term, count)| {
                let mut docs = FxHashMap::default();
                docs.insert(record.clone(), count);
                (term, docs)
            })
            .collect();

        Ok(PartialIndex::Content(local))
    }
}
