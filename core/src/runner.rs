//! Engine process invocation.
//!
//! One subprocess per job, hard wall-clock timeout, captured output.
//! The [`EngineRunner`] trait is the seam the orchestrator depends on;
//! tests substitute stubs for it, production uses [`NmapRunner`].

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use drover_common::job::{RunOutcome, ScanJob};

/// Executes one job against the external engine.
#[async_trait]
pub trait EngineRunner: Send + Sync {
    async fn execute(&self, job: &ScanJob) -> RunOutcome;
}

/// Drives an nmap-compatible binary.
pub struct NmapRunner {
    binary: String,
}

/// Stderr fragments that mark a nonzero exit as worth retrying.
///
/// The engine does not document its exit codes; this list is the explicit
/// transient-vs-fatal policy. Matching is case-insensitive.
const TRANSIENT_STDERR: &[&str] = &[
    "unreachable",
    "timed out",
    "timeout",
    "temporary failure",
    "resource temporarily unavailable",
    "try again",
    "network is down",
];

impl NmapRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full argument vector for a job: mode flags, XML to stdout, target.
    pub fn build_args(job: &ScanJob) -> Vec<String> {
        let mut args = job.options.to_args();
        args.push("-oX".to_string());
        args.push("-".to_string());
        args.push(job.addr.to_string());
        args
    }

    /// Checks whether the engine binary is present and runnable.
    pub async fn probe(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl EngineRunner for NmapRunner {
    async fn execute(&self, job: &ScanJob) -> RunOutcome {
        let args = Self::build_args(job);
        debug!(
            addr = %job.addr,
            attempt = job.attempt,
            "spawning {} {}",
            self.binary,
            args.join(" ")
        );

        // kill_on_drop guarantees the child is reaped on every exit path,
        // including the timeout branch below dropping the wait future.
        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => return classify_spawn_error(&e),
        };

        match tokio::time::timeout(job.timeout, child.wait_with_output()).await {
            Err(_elapsed) => RunOutcome::Transient {
                reason: "timeout".to_string(),
            },
            Ok(Err(e)) => RunOutcome::Fatal {
                reason: format!("engine I/O failure: {e}"),
            },
            Ok(Ok(output)) => {
                if output.status.success() {
                    RunOutcome::Completed {
                        raw_output: String::from_utf8_lossy(&output.stdout).into_owned(),
                    }
                } else {
                    classify_nonzero(
                        output.status.code(),
                        &String::from_utf8_lossy(&output.stderr),
                    )
                }
            }
        }
    }
}

fn classify_spawn_error(e: &std::io::Error) -> RunOutcome {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::NotFound => RunOutcome::Fatal {
            reason: "engine binary not found".to_string(),
        },
        ErrorKind::PermissionDenied => RunOutcome::Fatal {
            reason: "permission denied executing engine".to_string(),
        },
        // Fork/pipe exhaustion can clear up on its own.
        _ => RunOutcome::Transient {
            reason: format!("spawn failed: {e}"),
        },
    }
}

/// Classifies a nonzero engine exit by its stderr.
fn classify_nonzero(code: Option<i32>, stderr: &str) -> RunOutcome {
    let reason = match stderr.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => format!("engine exit {:?}: {}", code, line.trim()),
        None => format!("engine exit {code:?}"),
    };

    let lower = stderr.to_lowercase();
    if TRANSIENT_STDERR.iter().any(|pat| lower.contains(pat)) {
        RunOutcome::Transient { reason }
    } else {
        RunOutcome::Fatal { reason }
    }
}
