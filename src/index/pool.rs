//! Bounded worker pool for indexing tasks.
//!
//! A fixed number of worker loops run on a rayon thread pool and pull jobs
//! from a bounded crossbeam channel. Submitting into a full queue blocks the
//! submitter (backpressure) until a worker frees a slot or the run deadline
//! passes. A deadline of `None` means no time limit. Cancellation is cooperative: once the shared flag is set, queued
//! jobs are skipped and running jobs may poll the flag to stop early.

use crate::error::{IndexError, IndexResult};
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

/// A unit of work. Receives the pool's cancellation flag.
pub type Job = Box<dyn FnOnce(&CancellationFlag) + Send + 'static>;

/// Shared, cloneable cancellation signal
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct Counters {
    executed: AtomicUsize,
    skipped: AtomicUsize,
    panicked: AtomicUsize,
    rejected: AtomicUsize,
}

/// What happened to the jobs of one pool, reported by [`WorkerPool::finish`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolOutcome {
    /// Jobs that ran to completion (successfully or not)
    pub executed: usize,
    /// Jobs dequeued after cancellation and never run
    pub skipped: usize,
    /// Jobs that panicked
    pub panicked: usize,
    /// Jobs that could not be queued before the deadline
    pub rejected: usize,
    /// The deadline passed before every worker drained the queue
    pub timed_out: bool,
}

pub struct WorkerPool {
    sender: Sender<Job>,
    done: Receiver<()>,
    workers: usize,
    cancel: CancellationFlag,
    counters: Arc<Counters>,
    // Dropping the rayon pool lets its threads exit once their loops return
    _threads: ThreadPool,
}

impl WorkerPool {
    /// Start `workers` worker loops sharing a queue of `queue_capacity` jobs
    pub fn new(workers: usize, queue_capacity: usize) -> IndexResult<Self> {
        let workers = workers.max(1);
        let threads = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("fre-worker-{i}"))
            .build()
            .map_err(|e| IndexError::WorkerPool(format!("Failed to create thread pool: {e}")))?;

        let (sender, receiver) = crossbeam_channel::bounded::<Job>(queue_capacity.max(1));
        let (done_tx, done) = crossbeam_channel::unbounded();
        let cancel = CancellationFlag::new();
        let counters = Arc::new(Counters::default());

        for _ in 0..workers {
            let receiver = receiver.clone();
            let done_tx = done_tx.clone();
            let cancel = cancel.clone();
            let counters = counters.clone();
            threads.spawn(move || {
                worker_loop(&receiver, &cancel, &counters);
                let _ = done_tx.send(());
            });
        }

        Ok(Self {
            sender,
            done,
            workers,
            cancel,
            counters,
            _threads: threads,
        })
    }

    /// The flag workers observe; setting it cancels outstanding jobs
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    /// Queue a job, blocking while the queue is full.
    ///
    /// Returns `false` if the job could not be queued before `deadline`, the
    /// deadline has already passed, or the pool has been cancelled. Rejected
    /// jobs are counted, not run.
    pub fn submit(&self, job: Job, deadline: Option<Instant>) -> bool {
        if self.cancel.is_cancelled() {
            return self.reject();
        }

        let queued = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return self.reject();
                }
                match self.sender.send_timeout(job, deadline - now) {
                    Ok(()) => true,
                    Err(SendTimeoutError::Timeout(_)) | Err(SendTimeoutError::Disconnected(_)) => false,
                }
            }
            None => self.sender.send(job).is_ok(),
        };

        queued || self.reject()
    }

    fn reject(&self) -> bool {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        false
    }

    /// Close the queue and wait for the workers to drain it.
    ///
    /// If `deadline` passes first, the pool is cancelled and this returns
    /// without waiting further; workers skip whatever is still queued.
    pub fn finish(self, deadline: Option<Instant>) -> PoolOutcome {
        let WorkerPool {
            sender,
            done,
            workers,
            cancel,
            counters,
            _threads,
        } = self;
        drop(sender);

        let mut timed_out = false;
        let mut finished = 0;
        while finished < workers {
            let received = match deadline {
                Some(deadline) => done.recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => done.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(()) => finished += 1,
                Err(RecvTimeoutError::Timeout) => {
                    cancel.cancel();
                    timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        PoolOutcome {
            executed: counters.executed.load(Ordering::SeqCst),
            skipped: counters.skipped.load(Ordering::SeqCst),
            panicked: counters.panicked.load(Ordering::SeqCst),
            rejected: counters.rejected.load(Ordering::SeqCst),
            timed_out,
        }
    }
}

fn worker_loop(receiver: &Receiver<Job>, cancel: &CancellationFlag, counters: &Counters) {
    for job in receiver.iter() {
        if cancel.is_cancelled() {
            counters.skipped.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| job(cancel))) {
            Ok(()) => {
                counters.executed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                counters.panicked.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Indexing task panicked");
            }
        }
    }
}
