#![no_main]

use fre::index::IndexStore;
use fre::query::{QueryExecutor, SearchCriteria};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON payloads must either fail to parse or evaluate without panicking
    let Ok(criteria) = serde_json::from_slice::<SearchCriteria>(data) else {
        return;
    };

    let store = IndexStore::new();
    if let Ok(results) = QueryExecutor::new(&store).search(&criteria) {
        assert!(results.is_empty());
    }
});
