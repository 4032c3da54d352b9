//! Shared fixtures: scripted engine runners and fast configs.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use drover_common::config::EngineConfig;
use drover_common::job::{RunOutcome, ScanJob};
use drover_core::runner::EngineRunner;

/// What the stub does on each execution.
pub enum Behavior {
    /// Report the job's address up with two open TCP ports.
    TwoPortReport,
    /// Every execution fails transiently.
    AlwaysTransient,
    /// Every execution fails fatally.
    FatalInvocation,
    /// Exit cleanly with output that is not engine XML.
    Garbage,
    /// Complete the first `n` executions, then hang until cancelled.
    HangAfter(usize),
}

/// Engine stand-in that counts executions.
pub struct StubRunner {
    executions: AtomicUsize,
    behavior: Behavior,
}

impl StubRunner {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            executions: AtomicUsize::new(0),
            behavior,
        }
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineRunner for StubRunner {
    async fn execute(&self, job: &ScanJob) -> RunOutcome {
        let prior = self.executions.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::TwoPortReport => RunOutcome::Completed {
                raw_output: two_port_xml(job.addr),
            },
            Behavior::AlwaysTransient => RunOutcome::Transient {
                reason: "host unreachable".to_string(),
            },
            Behavior::FatalInvocation => RunOutcome::Fatal {
                reason: "bad arguments".to_string(),
            },
            Behavior::Garbage => RunOutcome::Completed {
                raw_output: "segfault (core dumped)".to_string(),
            },
            Behavior::HangAfter(n) => {
                if prior < *n {
                    RunOutcome::Completed {
                        raw_output: two_port_xml(job.addr),
                    }
                } else {
                    // Parked until the orchestrator cancels the select.
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }
}

/// Minimal engine document: one host, ports 22 and 80 open.
pub fn two_port_xml(addr: IpAddr) -> String {
    format!(
        r#"<?xml version="1.0"?>
<nmaprun scanner="nmap" version="7.95">
<host><status state="up" reason="syn-ack"/><address addr="{addr}" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="open"/><service name="ssh"/></port>
<port protocol="tcp" portid="80"><state state="open"/><service name="http"/></port>
</ports>
</host>
</nmaprun>"#
    )
}

/// Config tuned so retry backoff does not slow the suite down.
pub fn fast_config(workers: usize, max_retries: u32) -> EngineConfig {
    EngineConfig {
        workers,
        max_retries,
        timeout: Duration::from_secs(5),
        backoff_base: Duration::from_millis(1),
        ..EngineConfig::default()
    }
}
