//! Job descriptors and their terminal outcomes.

use std::net::IpAddr;
use std::time::Duration;

use crate::report::HostReport;
use crate::scan::ScanOptions;

/// One immutable unit of work: a single address paired with a composed
/// option set. Retries produce a fresh descriptor via [`ScanJob::next_attempt`]
/// rather than mutating a dispatched one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanJob {
    pub id: u64,
    pub addr: IpAddr,
    pub options: ScanOptions,
    pub timeout: Duration,
    /// Zero-based execution attempt.
    pub attempt: u32,
    pub max_retries: u32,
}

impl ScanJob {
    pub fn new(
        id: u64,
        addr: IpAddr,
        options: ScanOptions,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            id,
            addr,
            options,
            timeout,
            attempt: 0,
            max_retries,
        }
    }

    /// Descriptor for the next execution of this job.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub fn retries_left(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// Executions performed so far, counting the attempt this descriptor
    /// stands for.
    pub fn executions(&self) -> u32 {
        self.attempt + 1
    }
}

/// Raw classification of one engine invocation.
///
/// Produced by the process runner; the orchestrator turns these into
/// terminal [`JobOutcome`]s, retrying `Transient` up to the job's cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Engine exited cleanly; `raw_output` is its stdout.
    Completed { raw_output: String },
    /// Expected to be retryable: timeout, temporary unreachability.
    Transient { reason: String },
    /// Retrying cannot fix this: bad invocation, permission error.
    Fatal { reason: String },
}

/// Terminal result of a job, exactly one per submitted job.
///
/// Monotonic per job: once emitted, an outcome is never revised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Engine ran and its output parsed; reports are already committed
    /// to the result store when this is emitted.
    Completed {
        job: ScanJob,
        reports: Vec<HostReport>,
    },
    /// Fatal failure, or transient failures exhausted the retry cap.
    Failed {
        job: ScanJob,
        reason: String,
        attempts: u32,
    },
    /// Cancellation drained this job before it ran.
    Cancelled { job: ScanJob },
}

impl JobOutcome {
    pub fn job(&self) -> &ScanJob {
        match self {
            JobOutcome::Completed { job, .. } => job,
            JobOutcome::Failed { job, .. } => job,
            JobOutcome::Cancelled { job } => job,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }
}
