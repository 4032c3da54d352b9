//! Job scheduling across a bounded worker pool.
//!
//! Jobs are seeded into a shared queue, `workers` tasks pull from it and
//! drive the engine runner. Transient failures are retried with
//! exponential backoff up to the job's cap; fatal failures surface
//! immediately. One job's failure never aborts the others. A
//! [`CancelHandle`] stops dispatch cooperatively: queued jobs drain as
//! `Cancelled`, in-flight engine invocations are killed best-effort, and
//! outcomes already emitted stay valid.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tracing::{debug, warn};

use drover_common::config::EngineConfig;
use drover_common::job::{JobOutcome, RunOutcome, ScanJob};
use drover_common::scan::ScanOptions;

use crate::parse;
use crate::runner::EngineRunner;
use crate::store::ResultStore;

/// Longest backoff is `base << BACKOFF_SHIFT_CAP`.
const BACKOFF_SHIFT_CAP: u32 = 5;

/// Cooperative cancellation signal, checked before each dispatch and
/// while sleeping between retries.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before re-checking the flag so a cancel between the
        // check and the await cannot be missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Finite stream of terminal outcomes, one per submitted job, in
/// completion order. Ends after the last outcome; not restartable.
pub struct OutcomeStream {
    rx: mpsc::Receiver<JobOutcome>,
}

impl OutcomeStream {
    pub async fn next(&mut self) -> Option<JobOutcome> {
        self.rx.recv().await
    }

    /// Drains the stream to completion.
    pub async fn collect_all(mut self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Schedules jobs across the worker pool and aggregates results.
pub struct Orchestrator {
    runner: Arc<dyn EngineRunner>,
    config: EngineConfig,
    store: ResultStore,
    cancel: CancelHandle,
    next_job_id: AtomicU64,
}

impl Orchestrator {
    pub fn new(runner: Arc<dyn EngineRunner>, config: EngineConfig) -> Self {
        Self {
            runner,
            config,
            store: ResultStore::new(),
            cancel: CancelHandle::new(),
            next_job_id: AtomicU64::new(0),
        }
    }

    /// Handle to the store results are committed into.
    pub fn store(&self) -> ResultStore {
        self.store.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Builds one job per address with the run's options applied.
    pub fn make_jobs(
        &self,
        addrs: impl IntoIterator<Item = std::net::IpAddr>,
        options: &ScanOptions,
    ) -> Vec<ScanJob> {
        addrs
            .into_iter()
            .map(|addr| {
                ScanJob::new(
                    self.next_job_id.fetch_add(1, Ordering::Relaxed),
                    addr,
                    options.clone(),
                    self.config.timeout,
                    self.config.max_retries,
                )
            })
            .collect()
    }

    /// Dispatches the jobs and returns the outcome stream.
    ///
    /// Outcomes arrive as jobs finish, not in submission order. Each job
    /// yields exactly one outcome; the stream ends when all workers are
    /// done. Successful reports are committed to the store before their
    /// outcome is emitted.
    pub fn submit(&self, jobs: Vec<ScanJob>) -> OutcomeStream {
        let total = jobs.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, rx) = mpsc::channel(total.max(1));

        let workers = self.config.workers.max(1).min(total.max(1));
        debug!(total, workers, "dispatching jobs");

        for _ in 0..workers {
            let ctx = WorkerCtx {
                queue: queue.clone(),
                outcomes: tx.clone(),
                runner: self.runner.clone(),
                store: self.store.clone(),
                cancel: self.cancel.clone(),
                backoff_base: self.config.backoff_base,
            };
            tokio::spawn(ctx.run());
        }

        OutcomeStream { rx }
    }
}

struct WorkerCtx {
    queue: Arc<Mutex<VecDeque<ScanJob>>>,
    outcomes: mpsc::Sender<JobOutcome>,
    runner: Arc<dyn EngineRunner>,
    store: ResultStore,
    cancel: CancelHandle,
    backoff_base: Duration,
}

impl WorkerCtx {
    async fn run(self) {
        loop {
            // The queue is fully seeded before workers start and retries
            // stay inside the worker, so an empty queue means done. The
            // lock is released before any await point.
            let job = self.queue.lock().expect("job queue poisoned").pop_front();
            let Some(job) = job else { break };

            let outcome = if self.cancel.is_cancelled() {
                JobOutcome::Cancelled { job }
            } else {
                self.run_job(job).await
            };

            if self.outcomes.send(outcome).await.is_err() {
                // Consumer dropped the stream; nobody is listening.
                break;
            }
        }
    }

    /// Executes one job to its terminal outcome, retrying in place.
    async fn run_job(&self, mut job: ScanJob) -> JobOutcome {
        loop {
            // Dropping the execute future on cancellation tears down the
            // engine subprocess via kill_on_drop.
            let run = tokio::select! {
                run = self.runner.execute(&job) => Some(run),
                _ = self.cancel.cancelled() => None,
            };
            let Some(run) = run else {
                return JobOutcome::Cancelled { job };
            };

            match run {
                RunOutcome::Completed { raw_output } => {
                    return match parse::parse_report(&raw_output) {
                        Ok(reports) => {
                            self.store.commit_all(reports.iter().cloned());
                            JobOutcome::Completed { job, reports }
                        }
                        Err(e) => {
                            warn!(addr = %job.addr, "discarding unparseable engine output: {e}");
                            JobOutcome::Failed {
                                attempts: job.executions(),
                                reason: format!("unparseable engine output: {e}"),
                                job,
                            }
                        }
                    };
                }
                RunOutcome::Transient { reason } => {
                    if !job.retries_left() {
                        return JobOutcome::Failed {
                            attempts: job.executions(),
                            reason: format!("retries exhausted: {reason}"),
                            job,
                        };
                    }

                    let delay = backoff_delay(self.backoff_base, job.attempt);
                    debug!(
                        addr = %job.addr,
                        attempt = job.attempt,
                        "transient failure ({reason}), retrying in {delay:?}"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancel.cancelled() => {
                            return JobOutcome::Cancelled { job };
                        }
                    }
                    job = job.next_attempt();
                }
                RunOutcome::Fatal { reason } => {
                    return JobOutcome::Failed {
                        attempts: job.executions(),
                        reason,
                        job,
                    };
                }
            }
        }
    }
}

/// Exponential backoff with a shift cap and ±25% jitter.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let scaled = base.saturating_mul(1u32 << attempt.min(BACKOFF_SHIFT_CAP));
    let jitter = rand::random_range(0.75..1.25);
    scaled.mul_f64(jitter)
}
