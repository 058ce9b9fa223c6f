use super::{IndexingStrategy, PartialIndex};
use crate::index::pool::CancellationFlag;
use crate::index::types::{NameIndex, RecordRef};
use anyhow::Result;
use std::path::Path;

/// Buckets a record under its exact file name, extension included
#[derive(Debug, Clone, Copy, Default)]
pub struct NameStrategy;

impl IndexingStrategy for NameStrategy {
    fn name(&self) -> &'static str {
        "name"
    }

    fn build(&self, _path: &Path, record: &RecordRef, _cancel: &CancellationFlag) -> Result<PartialIndex> {
        let mut local = NameIndex::default();
        local.insert(record.name.clone(), vec![record.clone()]);
        Ok(PartialIndex::Name(local))
    }
}
