use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{info, warn};

use drover_common::config::EngineConfig;
use drover_common::job::JobOutcome;
use drover_common::network::target;
use drover_common::report::HostReport;
use drover_common::scan::ScanOptions;
use drover_core::orchestrator::Orchestrator;
use drover_core::runner::NmapRunner;
use drover_core::store::ResultStore;

use crate::commands::ScanArgs;
use crate::terminal::{format, print, spinner};

struct RunTally {
    total: usize,
    completed: usize,
    failed: usize,
    cancelled: usize,
}

/// Runs one scan command to completion. Returns whether any job ended in
/// a terminal failure, which decides the process exit code.
pub async fn scan(args: ScanArgs, quiet: u8) -> anyhow::Result<bool> {
    let cfg = EngineConfig {
        binary: args.engine,
        workers: args.workers,
        timeout: Duration::from_secs(args.timeout),
        max_retries: args.retries,
        max_hosts: args.max_hosts,
        ..EngineConfig::default()
    };

    print::header("starting scan run", quiet);

    let addrs = target::to_addresses(args.target, cfg.max_hosts).context("invalid target")?;
    info!("{} address(es) queued with mode '{}'", addrs.len(), args.mode);

    let runner = Arc::new(NmapRunner::new(cfg.binary.clone()));
    let orchestrator = Orchestrator::new(runner, cfg);
    let store = orchestrator.store();

    // First interrupt cancels cooperatively, a second one force-exits.
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling remaining jobs");
            cancel.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let options = ScanOptions::new(args.mode);
    let jobs = orchestrator.make_jobs(addrs, &options);

    let mut tally = RunTally {
        total: jobs.len(),
        completed: 0,
        failed: 0,
        cancelled: 0,
    };

    let started = Instant::now();
    if quiet == 0 {
        spinner::start(format!("scanning {} host(s)...", tally.total));
    }

    let mut stream = orchestrator.submit(jobs);
    while let Some(outcome) = stream.next().await {
        match &outcome {
            JobOutcome::Completed { .. } => tally.completed += 1,
            JobOutcome::Failed {
                job,
                reason,
                attempts,
            } => {
                tally.failed += 1;
                warn!(
                    "{} failed after {} attempt(s): {}",
                    job.addr, attempts, reason
                );
            }
            JobOutcome::Cancelled { .. } => tally.cancelled += 1,
        }

        let done = tally.completed + tally.failed + tally.cancelled;
        spinner::update(format!(
            "{done}/{} done, {} failed...",
            tally.total, tally.failed
        ));
    }
    spinner::finish();

    run_ends(&store, &tally, started.elapsed(), quiet);

    if args.save {
        let path = store
            .export(std::path::Path::new("."))
            .context("exporting results")?;
        info!("results saved to {}", path.display());
    }

    Ok(tally.failed > 0)
}

fn run_ends(store: &ResultStore, tally: &RunTally, total_time: Duration, quiet: u8) {
    let mut reports = store.snapshot();

    if reports.is_empty() {
        print::header("zero hosts reported", quiet);
        print::no_results();
    } else {
        print::header("scan results", quiet);
        reports.sort_by_key(|r| r.addr);
        if quiet < 2 {
            print_reports(&reports);
        }
    }

    print_summary(tally, total_time, quiet);
}

fn print_reports(reports: &[HostReport]) {
    for (idx, report) in reports.iter().enumerate() {
        let name = match &report.hostname {
            Some(hostname) => format!("{} ({hostname})", report.addr),
            None => report.addr.to_string(),
        };
        print::tree_head(idx, &name);
        print::as_tree_one_level(format::host_details(report));
        if idx + 1 != reports.len() {
            println!();
        }
    }
}

fn print_summary(tally: &RunTally, total_time: Duration, quiet: u8) {
    let completed = format!("{} of {} jobs", tally.completed, tally.total)
        .bold()
        .green();
    let took = format::elapsed(total_time);
    let mut line = format!("Run complete: {completed} finished in {took}");

    if tally.failed > 0 {
        line.push_str(&format!(", {}", format!("{} failed", tally.failed).red().bold()));
    }
    if tally.cancelled > 0 {
        line.push_str(&format!(
            ", {}",
            format!("{} cancelled", tally.cancelled).yellow()
        ));
    }

    if quiet == 0 {
        print::fat_separator();
        print::centerln(&line);
    } else {
        info!("{line}");
    }
}
