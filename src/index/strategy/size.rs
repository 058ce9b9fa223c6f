use super::{IndexingStrategy, PartialIndex};
use crate::index::pool::CancellationFlag;
use crate::index::types::{RecordRef, SizeIndex};
use anyhow::Result;
use std::path::Path;

/// Buckets a record under its exact byte size
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeStrategy;

impl IndexingStrategy for SizeStrategy {
    fn name(&self) -> &'static str {
        "size"
    }

    fn build(&self, _path: &Path, record: &RecordRef, _cancel: &CancellationFlag) -> Result<PartialIndex> {
        let local = SizeIndex::from([(record.size_bytes, vec![record.clone()])]);
        Ok(PartialIndex::Size(local))
    }
}
