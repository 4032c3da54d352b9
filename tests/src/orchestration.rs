//! Orchestrator behavior over stub runners: exactly-once outcomes, retry
//! bounds, cancellation draining, store aggregation.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use drover_common::job::JobOutcome;
use drover_common::scan::{ScanMode, ScanOptions};
use drover_core::orchestrator::Orchestrator;
use drover_core::store::ResultFilter;

use crate::support::{Behavior, StubRunner, fast_config};

fn addrs(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| IpAddr::V4(Ipv4Addr::new(10, 0, (i / 256) as u8, (i % 256) as u8)))
        .collect()
}

#[tokio::test]
async fn hundred_jobs_over_ten_workers_complete_exactly_once() {
    let runner = Arc::new(StubRunner::new(Behavior::TwoPortReport));
    let orchestrator = Orchestrator::new(runner.clone(), fast_config(10, 2));
    let store = orchestrator.store();

    let jobs = orchestrator.make_jobs(addrs(100), &ScanOptions::new(ScanMode::Ping));
    let expected_ids: HashSet<u64> = jobs.iter().map(|j| j.id).collect();

    let outcomes = orchestrator.submit(jobs).collect_all().await;

    assert_eq!(outcomes.len(), 100, "one outcome per job");

    let seen_ids: HashSet<u64> = outcomes.iter().map(|o| o.job().id).collect();
    assert_eq!(seen_ids, expected_ids, "no duplicate or missing outcomes");

    assert!(outcomes.iter().all(|o| matches!(o, JobOutcome::Completed { .. })));
    assert_eq!(runner.executions(), 100);
    assert_eq!(store.len(), 100);
}

#[tokio::test]
async fn transient_failures_retry_to_the_cap_then_fail() {
    let runner = Arc::new(StubRunner::new(Behavior::AlwaysTransient));
    let orchestrator = Orchestrator::new(runner.clone(), fast_config(1, 3));

    let jobs = orchestrator.make_jobs(addrs(1), &ScanOptions::new(ScanMode::Ping));
    let outcomes = orchestrator.submit(jobs).collect_all().await;

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        JobOutcome::Failed {
            reason, attempts, ..
        } => {
            assert_eq!(*attempts, 4, "max_retries + 1 executions");
            assert!(reason.contains("retries exhausted"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(runner.executions(), 4);
}

#[tokio::test]
async fn fatal_failures_do_not_retry() {
    let runner = Arc::new(StubRunner::new(Behavior::FatalInvocation));
    let orchestrator = Orchestrator::new(runner.clone(), fast_config(2, 5));

    let jobs = orchestrator.make_jobs(addrs(3), &ScanOptions::new(ScanMode::Ping));
    let outcomes = orchestrator.submit(jobs).collect_all().await;

    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        match outcome {
            JobOutcome::Failed { attempts, .. } => assert_eq!(*attempts, 1),
            other => panic!("expected failure, got {other:?}"),
        }
    }
    assert_eq!(runner.executions(), 3, "no retries after fatal outcomes");
}

#[tokio::test]
async fn unparseable_output_fails_the_job_not_the_run() {
    let runner = Arc::new(StubRunner::new(Behavior::Garbage));
    let orchestrator = Orchestrator::new(runner.clone(), fast_config(2, 0));

    let jobs = orchestrator.make_jobs(addrs(4), &ScanOptions::new(ScanMode::Ping));
    let outcomes = orchestrator.submit(jobs).collect_all().await;

    assert_eq!(outcomes.len(), 4, "unparseable output never aborts the run");
    for outcome in &outcomes {
        match outcome {
            JobOutcome::Failed { reason, .. } => {
                assert!(reason.contains("unparseable engine output"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn stub_report_lands_in_the_store_queryable_by_host() {
    let target: IpAddr = "192.0.2.1".parse().unwrap();

    let runner = Arc::new(StubRunner::new(Behavior::TwoPortReport));
    let orchestrator = Orchestrator::new(runner, fast_config(1, 0));
    let store = orchestrator.store();

    let jobs = orchestrator.make_jobs(vec![target], &ScanOptions::new(ScanMode::Ping));
    let outcomes = orchestrator.submit(jobs).collect_all().await;
    assert_eq!(outcomes.len(), 1);

    let hits = store.query(&ResultFilter::host(target));
    assert_eq!(hits.len(), 1, "exactly one committed report for the host");
    assert_eq!(hits[0].ports.len(), 2);
    assert_eq!(hits[0].ports[0].number, 22);
    assert_eq!(hits[0].ports[1].number, 80);
}

#[tokio::test]
async fn cancellation_drains_pending_jobs_without_running_them() {
    let runner = Arc::new(StubRunner::new(Behavior::HangAfter(3)));
    let orchestrator = Orchestrator::new(runner.clone(), fast_config(1, 0));
    let cancel = orchestrator.cancel_handle();

    let jobs = orchestrator.make_jobs(addrs(10), &ScanOptions::new(ScanMode::Ping));
    let mut stream = orchestrator.submit(jobs);

    let mut completed = 0;
    let mut cancelled = 0;

    while let Some(outcome) = stream.next().await {
        match outcome {
            JobOutcome::Completed { .. } => {
                completed += 1;
                if completed == 3 {
                    cancel.cancel();
                }
            }
            JobOutcome::Cancelled { .. } => cancelled += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(completed, 3);
    assert_eq!(cancelled, 7);
    // The fourth execution may have started before the cancel landed;
    // jobs beyond it never reach the runner.
    assert!(runner.executions() <= 4);
    assert_eq!(orchestrator.store().len(), 3);
}

#[tokio::test]
async fn outcomes_arrive_for_every_job_even_with_more_workers_than_jobs() {
    let runner = Arc::new(StubRunner::new(Behavior::TwoPortReport));
    let orchestrator = Orchestrator::new(runner, fast_config(16, 0));

    let jobs = orchestrator.make_jobs(addrs(2), &ScanOptions::new(ScanMode::Version));
    let outcomes = orchestrator.submit(jobs).collect_all().await;

    assert_eq!(outcomes.len(), 2);
}
