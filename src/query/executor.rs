use crate::error::{SearchError, SearchResult};
use crate::index::store::IndexStore;
use crate::index::types::{FileRecord, RecordRef};
use crate::query::criteria::{Filter, SearchCriteria};
use rustc_hash::FxHashSet;
use std::ops::Bound;

pub type CandidateSet = FxHashSet<RecordRef>;

/// Evaluates search criteria against an [`IndexStore`].
///
/// Every active filter yields a candidate set and the result is their
/// intersection. There is no ranking: the result is an unordered set of
/// records. Lookups take each index's read lock only while the candidate set
/// is being collected, so a search during indexing sees whatever has been
/// merged so far.
pub struct QueryExecutor<'a> {
    store: &'a IndexStore,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    /// Execute a search.
    ///
    /// Criteria with no active filter yield an empty result.
    pub fn search(&self, criteria: &SearchCriteria) -> SearchResult<Vec<FileRecord>> {
        if let Some(field) = criteria.unsupported_filter() {
            tracing::debug!(field, "Rejecting search with unsupported filter");
            return Err(SearchError::UnsupportedFilter(field));
        }

        let filters = criteria.filters();
        if filters.is_empty() {
            tracing::debug!("Search without active filters");
            return Ok(Vec::new());
        }

        let mut sets: Vec<CandidateSet> = Vec::with_capacity(filters.len());
        for filter in &filters {
            let set = self.candidates(filter);
            if set.is_empty() {
                return Ok(Vec::new());
            }
            sets.push(set);
        }

        let matches = intersect_all(sets);
        Ok(matches.into_iter().map(|r| FileRecord::clone(&r)).collect())
    }

    /// Candidate set for a single filter
    pub fn candidates(&self, filter: &Filter<'_>) -> CandidateSet {
        match filter {
            Filter::Name(name) => self.name_candidates(name),
            Filter::Size { min, max } => self.signed_size_candidates(*min, *max),
            Filter::Content(words) => self.content_candidates(words),
            Filter::FileType(ext) => self.type_candidates(ext),
        }
    }

    /// Records whose name is exactly `name`
    pub fn name_candidates(&self, name: &str) -> CandidateSet {
        self.store
            .name_index()
            .get(name)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Size lookup for bounds as they arrive in criteria. A negative lower
    /// bound admits every size and a negative upper bound admits none.
    pub fn signed_size_candidates(&self, min: Option<i64>, max: Option<i64>) -> CandidateSet {
        let max = match max {
            Some(m) if m < 0 => return CandidateSet::default(),
            Some(m) => Some(m.unsigned_abs()),
            None => None,
        };
        let min = min.map(|m| u64::try_from(m).unwrap_or(0));
        self.size_candidates(min, max)
    }

    /// Records whose size lies in `[min, max]`; an absent bound is open
    pub fn size_candidates(&self, min: Option<u64>, max: Option<u64>) -> CandidateSet {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return CandidateSet::default();
            }
        }

        let lower = min.map_or(Bound::Unbounded, Bound::Included);
        let upper = max.map_or(Bound::Unbounded, Bound::Included);

        self.store
            .size_index()
            .range((lower, upper))
            .flat_map(|(_, records)| records.iter().cloned())
            .collect()
    }

    /// Records containing every word at least once.
    ///
    /// Words are expected lowercased. A word absent from the corpus empties
    /// the whole result.
    pub fn content_candidates(&self, words: &[String]) -> CandidateSet {
        let content = self.store.content_index();

        let mut per_word: Vec<CandidateSet> = Vec::with_capacity(words.len());
        for word in words {
            match content.get(word.as_str()) {
                Some(docs) => per_word.push(docs.keys().cloned().collect()),
                None => return CandidateSet::default(),
            }
        }

        intersect_all(per_word)
    }

    /// Records whose extension matches `ext`, ignoring ASCII case
    pub fn type_candidates(&self, ext: &str) -> CandidateSet {
        self.store
            .name_index()
            .values()
            .flatten()
            .filter(|record| record.extension.eq_ignore_ascii_case(ext))
            .cloned()
            .collect()
    }
}

/// Intersect candidate sets, smallest first. No sets yields an empty set.
fn intersect_all(mut sets: Vec<CandidateSet>) -> CandidateSet {
    sets.sort_by_key(|s| s.len());

    let mut iter = sets.into_iter();
    let Some(mut result) = iter.next() else {
        return CandidateSet::default();
    };
    for set in iter {
        result.retain(|record| set.contains(record));
        if result.is_empty() {
            break;
        }
    }
    result
}
