//! Shared holder of the three global indexes.
//!
//! Each index sits behind its own lock, so merges into different indexes run
//! concurrently while merges into the same index serialize. Merging is pure
//! in-memory accumulation: content counts are summed and size/name buckets
//! are appended to. Nothing is ever removed, and merging the same partial
//! index twice counts it twice.

use crate::index::stats::IndexStats;
use crate::index::strategy::PartialIndex;
use crate::index::types::{ContentIndex, NameIndex, SizeIndex};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::hash_map;

#[derive(Debug, Default)]
pub struct IndexStore {
    content: RwLock<ContentIndex>,
    size: RwLock<SizeIndex>,
    name: RwLock<NameIndex>,
}

impl IndexStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial index into whichever global index it belongs to
    pub fn merge(&self, partial: PartialIndex) {
        match partial {
            PartialIndex::Content(local) => self.merge_content(local),
            PartialIndex::Size(local) => self.merge_size(local),
            PartialIndex::Name(local) => self.merge_name(local),
        }
    }

    /// Sum per-record term counts into the global content index
    pub fn merge_content(&self, local: ContentIndex) {
        let mut global = self.content.write();
        for (term, local_docs) in local {
            match global.entry(term) {
                hash_map::Entry::Occupied(mut entry) => {
                    let global_docs = entry.get_mut();
                    for (record, count) in local_docs {
                        *global_docs.entry(record).or_insert(0) += count;
                    }
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(local_docs);
                }
            }
        }
    }

    /// Append size buckets into the global size index
    pub fn merge_size(&self, local: SizeIndex) {
        let mut global = self.size.write();
        for (size, mut records) in local {
            global.entry(size).or_default().append(&mut records);
        }
    }

    /// Append name buckets into the global name index
    pub fn merge_name(&self, local: NameIndex) {
        let mut global = self.name.write();
        for (name, mut records) in local {
            global.entry(name).or_default().append(&mut records);
        }
    }

    /// Read view of the content index.
    ///
    /// The view reflects every merge completed before it was taken. While an
    /// indexing run is in flight that is a partial index. Hold it only for
    /// the duration of a lookup: merges into this index wait on it.
    pub fn content_index(&self) -> RwLockReadGuard<'_, ContentIndex> {
        self.content.read()
    }

    /// Read view of the size index (see [`IndexStore::content_index`])
    pub fn size_index(&self) -> RwLockReadGuard<'_, SizeIndex> {
        self.size.read()
    }

    /// Read view of the name index (see [`IndexStore::content_index`])
    pub fn name_index(&self) -> RwLockReadGuard<'_, NameIndex> {
        self.name.read()
    }

    /// Summary counts over all three indexes
    pub fn stats(&self) -> IndexStats {
        IndexStats::collect(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{FileRecord, RecordRef};
    use rustc_hash::FxHashMap;
    use std::sync::Arc;
    use std::thread;

    fn record(name: &str, size: u64) -> RecordRef {
        Arc::new(FileRecord::new(name, format!("/data/{}", name), size, 0))
    }

    fn content_partial(record: &RecordRef, terms: &[(&str, u64)]) -> ContentIndex {
        let mut local = ContentIndex::default();
        for &(term, count) in terms {
            let mut docs = FxHashMap::default();
            docs.insert(record.clone(), count);
            local.insert(term.to_string(), docs);
        }
        local
    }

    #[test]
    fn test_merge_content_sums_counts() {
        let store = IndexStore::new();
        let a = record("a.txt", 11);
        let b = record("b.txt", 5);

        store.merge_content(content_partial(&a, &[("hello", 1), ("world", 1)]));
        store.merge_content(content_partial(&b, &[("hello", 3)]));

        let content = store.content_index();
        assert_eq!(content["hello"][&a], 1);
        assert_eq!(content["hello"][&b], 3);
        assert_eq!(content["world"].len(), 1);
    }

    #[test]
    fn test_merge_content_twice_double_counts() {
        let store = IndexStore::new();
        let a = record("a.txt", 11);
        let partial = content_partial(&a, &[("hello", 2), ("world", 1)]);

        store.merge_content(partial.clone());
        let once = store.content_index()["hello"][&a];
        store.merge_content(partial);
        let content = store.content_index();

        assert_eq!(once, 2);
        assert_eq!(content["hello"][&a], 2 * once);
        assert_eq!(content["world"][&a], 2);
    }

    #[test]
    fn test_merge_size_appends_in_order() {
        let store = IndexStore::new();
        let a = record("a.txt", 5);
        let b = record("b.txt", 5);

        store.merge_size(SizeIndex::from([(5, vec![a.clone()])]));
        store.merge_size(SizeIndex::from([(5, vec![b.clone()])]));

        assert_eq!(store.size_index()[&5u64], vec![a, b]);
    }

    #[test]
    fn test_merge_name_twice_duplicates() {
        let store = IndexStore::new();
        let a = record("a.txt", 5);
        let mut local = NameIndex::default();
        local.insert("a.txt".to_string(), vec![a.clone()]);

        store.merge_name(local.clone());
        store.merge_name(local);

        assert_eq!(store.name_index()["a.txt"].len(), 2);
    }

    #[test]
    fn test_merge_dispatches_partial() {
        let store = IndexStore::new();
        let a = record("a.txt", 7);

        store.merge(PartialIndex::Size(SizeIndex::from([(7, vec![a.clone()])])));
        store.merge(PartialIndex::Name(NameIndex::from_iter([(
            "a.txt".to_string(),
            vec![a.clone()],
        )])));

        assert_eq!(store.size_index().len(), 1);
        assert_eq!(store.name_index().len(), 1);
        assert!(store.content_index().is_empty());
    }

    #[test]
    fn test_concurrent_merges_are_commutative() {
        let store = Arc::new(IndexStore::new());
        let records: Vec<RecordRef> = (0..64).map(|i| record(&format!("f{}.txt", i), i % 4)).collect();

        let handles: Vec<_> = records
            .iter()
            .cloned()
            .map(|r| {
                let store = store.clone();
                thread::spawn(move || {
                    store.merge_content(content_partial(&r, &[("shared", 1)]));
                    store.merge_size(SizeIndex::from([(r.size_bytes, vec![r.clone()])]));
                    store.merge_name(NameIndex::from_iter([(r.name.clone(), vec![r.clone()])]));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.content_index()["shared"].len(), 64);
        let total: usize = store.size_index().values().map(Vec::len).sum();
        assert_eq!(total, 64);
        assert_eq!(store.size_index().len(), 4);
        assert_eq!(store.name_index().len(), 64);
    }
}
