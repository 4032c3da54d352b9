#![cfg(unix)]
//! Process runner behavior against real subprocesses, using throwaway
//! shell scripts as the engine binary.

use std::net::{IpAddr, Ipv4Addr};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use drover_common::job::{RunOutcome, ScanJob};
use drover_common::scan::{ScanMode, ScanOptions};
use drover_core::parse;
use drover_core::runner::{EngineRunner, NmapRunner};

struct Script(PathBuf);

impl Script {
    fn new(name: &str, body: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "drover-engine-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();

        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for Script {
    fn drop(&mut self) {
        std::fs::remove_file(&self.0).ok();
    }
}

fn job(timeout: Duration) -> ScanJob {
    ScanJob::new(
        1,
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        ScanOptions::new(ScanMode::Ping),
        timeout,
        0,
    )
}

#[tokio::test]
async fn timeout_returns_transient_without_waiting_out_the_child() {
    let script = Script::new("hang", "sleep 30");
    let runner = NmapRunner::new(script.path());

    let started = Instant::now();
    let outcome = runner.execute(&job(Duration::from_millis(200))).await;

    match outcome {
        RunOutcome::Transient { reason } => assert_eq!(reason, "timeout"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "runner must not wait for the full child sleep"
    );
}

#[tokio::test]
async fn missing_binary_is_fatal() {
    let runner = NmapRunner::new("/nonexistent/drover-engine");
    let outcome = runner.execute(&job(Duration::from_secs(5))).await;

    match outcome {
        RunOutcome::Fatal { reason } => assert!(reason.contains("not found")),
        other => panic!("expected fatal, got {other:?}"),
    }
}

#[tokio::test]
async fn clean_exit_yields_parseable_output() {
    let script = Script::new(
        "report",
        r#"echo '<nmaprun scanner="nmap"><host><status state="up"/><address addr="127.0.0.1" addrtype="ipv4"/></host></nmaprun>'"#,
    );
    let runner = NmapRunner::new(script.path());

    let outcome = runner.execute(&job(Duration::from_secs(5))).await;
    match outcome {
        RunOutcome::Completed { raw_output } => {
            let reports = parse::parse_report(&raw_output).unwrap();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_stderr_on_nonzero_exit_is_transient() {
    let script = Script::new("unreachable", "echo 'route to host unreachable' >&2; exit 1");
    let runner = NmapRunner::new(script.path());

    let outcome = runner.execute(&job(Duration::from_secs(5))).await;
    assert!(matches!(outcome, RunOutcome::Transient { .. }));
}

#[tokio::test]
async fn unexplained_nonzero_exit_is_fatal() {
    let script = Script::new("broken", "exit 3");
    let runner = NmapRunner::new(script.path());

    let outcome = runner.execute(&job(Duration::from_secs(5))).await;
    match outcome {
        RunOutcome::Fatal { reason } => assert!(reason.contains("3")),
        other => panic!("expected fatal, got {other:?}"),
    }
}

#[tokio::test]
async fn probe_detects_runnable_and_missing_engines() {
    let script = Script::new("probe", "exit 0");
    assert!(NmapRunner::new(script.path()).probe().await);
    assert!(!NmapRunner::new("/nonexistent/drover-engine").probe().await);
}
