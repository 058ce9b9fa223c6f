use crate::index::build::IndexReport;
use crate::index::store::IndexStore;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Summary counts over the three indexes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Distinct records across the name index
    pub records: usize,
    pub distinct_names: usize,
    pub distinct_sizes: usize,
    /// Distinct terms in the content index
    pub terms: usize,
    /// Sum of every per-record term count
    pub term_occurrences: u64,
    /// Records with at least one content entry
    pub content_records: usize,
    /// Total bytes over distinct records
    pub total_bytes: u64,
}

impl IndexStats {
    /// Collect counts from a store. Each index is read under its own lock in
    /// turn, so the numbers may straddle a merge during an indexing run.
    pub fn collect(store: &IndexStore) -> Self {
        let mut stats = IndexStats::default();

        {
            let names = store.name_index();
            stats.distinct_names = names.len();
            let mut seen = FxHashSet::default();
            for record in names.values().flatten() {
                if seen.insert(record) {
                    stats.total_bytes += record.size_bytes;
                }
            }
            stats.records = seen.len();
        }

        stats.distinct_sizes = store.size_index().len();

        {
            let content = store.content_index();
            stats.terms = content.len();
            let mut seen = FxHashSet::default();
            for docs in content.values() {
                for (record, count) in docs {
                    stats.term_occurrences += count;
                    seen.insert(record);
                }
            }
            stats.content_records = seen.len();
        }

        stats
    }
}

/// Display index statistics
pub fn print_stats(stats: &IndexStats, report: Option<&IndexReport>) {
    println!("Index Statistics");
    println!("================");
    println!();

    if let Some(report) = report {
        println!("Root path:        {}", report.root.display());
        println!("Files found:      {}", report.files);
        println!("Entries skipped:  {}", report.skipped_entries);
        println!("Tasks submitted:  {}", report.tasks_submitted);
        println!("Tasks merged:     {}", report.tasks_merged);
        println!("Tasks failed:     {}", report.tasks_failed);
        println!("Tasks cancelled:  {}", report.tasks_cancelled);
        println!("Elapsed:          {:.3}s", report.elapsed.as_secs_f64());
        if report.timed_out {
            println!("Deadline:         expired");
        }
        println!();
    }

    println!("Records:          {}", stats.records);
    println!("Total size:       {}", format_size(stats.total_bytes));
    println!("Distinct names:   {}", stats.distinct_names);
    println!("Distinct sizes:   {}", stats.distinct_sizes);
    println!("Content records:  {}", stats.content_records);
    println!("Distinct terms:   {}", stats.terms);
    println!("Term occurrences: {}", stats.term_occurrences);
}

/// Format byte count as human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
