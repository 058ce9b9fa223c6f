use crate::error::IndexResult;
use crate::index::crawl::{CrawlEntry, crawl};
use crate::index::pool::{CancellationFlag, WorkerPool};
use crate::index::store::IndexStore;
use crate::index::strategy::{IndexingStrategy, default_strategies};
use crate::index::types::IndexConfig;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Summary of one indexing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub root: PathBuf,
    /// Files discovered by the crawl
    pub files: usize,
    /// Crawl entries that could not be inspected
    pub skipped_entries: usize,
    /// (file, strategy) tasks queued on the pool
    pub tasks_submitted: usize,
    /// Tasks whose partial index was merged into the store
    pub tasks_merged: usize,
    /// Tasks whose strategy failed; the file contributes nothing for it
    pub tasks_failed: usize,
    /// Tasks never run or abandoned because the run was cancelled
    pub tasks_cancelled: usize,
    pub elapsed: Duration,
    /// The deadline expired before the crawl or its tasks finished
    pub timed_out: bool,
}

/// Crawls a directory and feeds every file through every strategy on a
/// bounded worker pool, merging the results into a shared [`IndexStore`].
///
/// Each call to [`Indexer::index`] starts its own pool and shuts it down
/// before returning, so several runs may populate the same store.
pub struct Indexer {
    store: Arc<IndexStore>,
    strategies: Vec<Arc<dyn IndexingStrategy>>,
    config: IndexConfig,
}

impl Indexer {
    /// Create an indexer running the content, size and name strategies
    pub fn new(store: Arc<IndexStore>, config: IndexConfig) -> Self {
        let strategies = default_strategies(&config);
        Self::with_strategies(store, strategies, config)
    }

    /// Create an indexer with an explicit strategy list
    pub fn with_strategies(
        store: Arc<IndexStore>,
        strategies: Vec<Arc<dyn IndexingStrategy>>,
        config: IndexConfig,
    ) -> Self {
        Self {
            store,
            strategies,
            config,
        }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index every file under `root`.
    ///
    /// Blocks until all tasks finish or the configured deadline passes. Once
    /// the deadline has passed the crawl stops, nothing more is scheduled and
    /// outstanding tasks are cancelled. The run is still reported as
    /// completed (see [`IndexReport::timed_out`]).
    pub fn index(&self, root: &Path) -> IndexResult<IndexReport> {
        let start = Instant::now();
        let deadline = deadline_after(start, self.config.deadline);
        tracing::info!(root = %root.display(), "Start indexing...");

        let pool = WorkerPool::new(
            self.config.effective_worker_threads(),
            self.config.queue_capacity,
        )?;

        let progress = self.config.show_progress.then(new_progress_bar);
        let merged = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let abandoned = Arc::new(AtomicUsize::new(0));
        let mut submitted = 0usize;

        let crawl_summary = crawl(root, self.config.follow_links, |entry: CrawlEntry| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                pool.cancellation().cancel();
                return ControlFlow::Break(());
            }

            for strategy in &self.strategies {
                let strategy = strategy.clone();
                let store = self.store.clone();
                let path = entry.path.clone();
                let record = entry.record.clone();
                let merged = merged.clone();
                let failed = failed.clone();
                let abandoned = abandoned.clone();
                let progress = progress.clone();

                let job = Box::new(move |cancel: &CancellationFlag| {
                    match strategy.build(&path, &record, cancel) {
                        Ok(partial) => {
                            store.merge(partial);
                            merged.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) if cancel.is_cancelled() => {
                            abandoned.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(
                                strategy = strategy.name(),
                                path = %path.display(),
                                "Error processing file: {:#}",
                                e
                            );
                        }
                    }
                    if let Some(ref pb) = progress {
                        pb.inc(1);
                    }
                });

                if pool.submit(job, deadline) {
                    submitted += 1;
                } else {
                    // Only a passed deadline or cancellation rejects a job
                    pool.cancellation().cancel();
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })?;

        let outcome = pool.finish(deadline);
        let timed_out = outcome.timed_out || crawl_summary.stopped;

        if crawl_summary.stopped {
            tracing::warn!(
                files = crawl_summary.files,
                "Deadline passed while crawling; remaining files were not scheduled"
            );
        }
        if timed_out {
            tracing::warn!(
                deadline_secs = self.config.deadline.as_secs(),
                "Indexing did not finish in the given time; outstanding tasks cancelled"
            );
        }
        if outcome.rejected > 0 {
            tracing::warn!(rejected = outcome.rejected, "Tasks could not be queued before the deadline");
        }

        let elapsed = start.elapsed();
        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} files", crawl_summary.files));
        }
        tracing::info!(
            files = crawl_summary.files,
            tasks = submitted,
            "Finished indexing! Time taken: {:.3} seconds",
            elapsed.as_secs_f64()
        );

        let tasks_merged = merged.load(Ordering::SeqCst);
        let tasks_failed = failed.load(Ordering::SeqCst) + outcome.panicked;
        Ok(IndexReport {
            root: root.to_path_buf(),
            files: crawl_summary.files,
            skipped_entries: crawl_summary.skipped,
            tasks_submitted: submitted,
            tasks_merged,
            tasks_failed,
            tasks_cancelled: submitted.saturating_sub(tasks_merged + tasks_failed),
            elapsed,
            timed_out,
        })
    }
}

/// Absolute deadline for a run started at `start`, or `None` when `limit`
/// reaches past what an [`Instant`] can represent
fn deadline_after(start: Instant, limit: Duration) -> Option<Instant> {
    let deadline = start.checked_add(limit);
    if deadline.is_none() {
        tracing::debug!(limit_secs = limit.as_secs(), "Deadline out of range; indexing without a time limit");
    }
    deadline
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} tasks {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Indexing files...");
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::index::strategy::{NameStrategy, PartialIndex};
    use crate::index::types::RecordRef;
    use anyhow::{Result, bail};
    use std::fs;
    use tempfile::TempDir;

    struct FailingStrategy;

    impl IndexingStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn build(&self, path: &Path, _record: &RecordRef, _cancel: &CancellationFlag) -> Result<PartialIndex> {
            bail!("cannot index {}", path.display())
        }
    }

    fn small_config() -> IndexConfig {
        IndexConfig {
            worker_threads: 2,
            queue_capacity: 4,
            ..IndexConfig::default()
        }
    }

    #[test]
    fn test_failing_strategy_does_not_affect_others() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let store = Arc::new(IndexStore::new());
        let indexer = Indexer::with_strategies(
            store.clone(),
            vec![Arc::new(FailingStrategy), Arc::new(NameStrategy)],
            small_config(),
        );
        let report = indexer.index(dir.path()).unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.tasks_submitted, 4);
        assert_eq!(report.tasks_failed, 2);
        assert_eq!(report.tasks_merged, 2);
        assert!(!report.timed_out);
        assert_eq!(store.name_index().len(), 2);
    }

    #[test]
    fn test_empty_dataset_schedules_nothing() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(IndexStore::new());
        let indexer = Indexer::new(store.clone(), small_config());

        let result = indexer.index(dir.path());
        assert!(matches!(result, Err(IndexError::DatasetEmpty { .. })));
        assert!(store.name_index().is_empty());
        assert!(store.size_index().is_empty());
    }

    #[test]
    fn test_expired_deadline_still_reports_completion() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{}.txt", i)), "words words").unwrap();
        }

        let store = Arc::new(IndexStore::new());
        let config = IndexConfig {
            deadline: Duration::ZERO,
            ..small_config()
        };
        let report = Indexer::new(store.clone(), config).index(dir.path()).unwrap();

        assert!(report.timed_out);
        assert_eq!(report.tasks_submitted, 0);
        assert_eq!(report.tasks_merged, 0);
        assert!(report.files < 20);
        assert!(store.name_index().is_empty());
    }

    /// Spins until cancelled
    struct SlowStrategy;

    impl IndexingStrategy for SlowStrategy {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn build(&self, path: &Path, _record: &RecordRef, cancel: &CancellationFlag) -> Result<PartialIndex> {
            let give_up = Instant::now() + Duration::from_secs(30);
            while !cancel.is_cancelled() && Instant::now() < give_up {
                std::thread::sleep(Duration::from_millis(5));
            }
            bail!("gave up on {}", path.display())
        }
    }

    #[test]
    fn test_slow_strategy_outlives_short_deadline() {
        let dir = TempDir::new().unwrap();
        for i in 0..8 {
            fs::write(dir.path().join(format!("f{}.txt", i)), "x").unwrap();
        }

        let store = Arc::new(IndexStore::new());
        let config = IndexConfig {
            worker_threads: 2,
            queue_capacity: 2,
            deadline: Duration::from_millis(200),
            ..IndexConfig::default()
        };
        let indexer = Indexer::with_strategies(store.clone(), vec![Arc::new(SlowStrategy)], config);
        let report = indexer.index(dir.path()).unwrap();

        assert!(report.timed_out);
        assert_eq!(report.tasks_merged, 0);
        assert!(report.elapsed < Duration::from_secs(10), "elapsed {:?}", report.elapsed);
    }

    #[test]
    fn test_unrepresentable_deadline_means_no_limit() {
        let start = Instant::now();
        assert_eq!(deadline_after(start, Duration::from_secs(u64::MAX)), None);
        assert_eq!(deadline_after(start, Duration::from_secs(1)), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_huge_deadline_indexes_everything() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello world").unwrap();
        fs::write(dir.path().join("b.txt"), "hello").unwrap();

        let store = Arc::new(IndexStore::new());
        let config = IndexConfig {
            deadline: Duration::from_secs(u64::MAX),
            ..small_config()
        };
        let report = Indexer::new(store.clone(), config).index(dir.path()).unwrap();

        assert!(!report.timed_out);
        assert_eq!(report.tasks_merged, 6);
        assert_eq!(store.name_index().len(), 2);
    }
}
