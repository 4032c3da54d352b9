//! Aggregation of committed scan results.
//!
//! The store is the single serialization point of a run: workers commit
//! from concurrent tasks, consumers query snapshots. Handles are cheap
//! clones sharing one collection.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;

use drover_common::report::{HostReport, HostState, PortState, Protocol};

/// Thread-safe, insertion-ordered collection of host reports.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<Vec<HostReport>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, report: HostReport) {
        self.inner.write().expect("result store poisoned").push(report);
    }

    pub fn commit_all(&self, reports: impl IntoIterator<Item = HostReport>) {
        let mut guard = self.inner.write().expect("result store poisoned");
        guard.extend(reports);
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("result store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports matching the filter, in insertion order. The returned
    /// vector is a snapshot; repeated queries are independent.
    pub fn query(&self, filter: &ResultFilter) -> Vec<HostReport> {
        self.inner
            .read()
            .expect("result store poisoned")
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<HostReport> {
        self.inner.read().expect("result store poisoned").clone()
    }

    /// Dumps all committed reports as flat text into `dir`, returning the
    /// path of the timestamped file.
    pub fn export(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("drover_results_{stamp}.txt"));

        let mut lines: Vec<String> = Vec::new();
        for report in self.snapshot() {
            let hostname = report.hostname.as_deref().unwrap_or("");
            lines.push(format!("Host: {} ({})", report.addr, hostname));
            lines.push(format!("State: {}", report.state));
            if report.partial {
                lines.push("Note: report is partial".to_string());
            }
            for port in &report.ports {
                let service = port
                    .service
                    .as_ref()
                    .map(|s| s.name.as_str())
                    .unwrap_or("unknown");
                lines.push(format!(
                    "Protocol: {}\tPort: {}\tState: {}\tService: {}",
                    port.protocol, port.number, port.state, service
                ));
            }
            lines.push(String::new());
        }

        std::fs::write(&path, lines.join("\n"))
            .with_context(|| format!("writing results to {}", path.display()))?;
        Ok(path)
    }
}

/// Conjunctive filter over committed reports.
///
/// Port-level criteria (`port`, `port_state`, `protocol`) match a report
/// when at least one of its port entries satisfies all of them together.
#[derive(Clone, Debug, Default)]
pub struct ResultFilter {
    pub addr: Option<IpAddr>,
    pub port: Option<u16>,
    pub port_state: Option<PortState>,
    pub protocol: Option<Protocol>,
    pub only_up: bool,
}

impl ResultFilter {
    pub fn host(addr: IpAddr) -> Self {
        Self {
            addr: Some(addr),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_port_state(mut self, state: PortState) -> Self {
        self.port_state = Some(state);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn up_only(mut self) -> Self {
        self.only_up = true;
        self
    }

    fn matches(&self, report: &HostReport) -> bool {
        if let Some(addr) = self.addr
            && report.addr != addr
        {
            return false;
        }

        if self.only_up && report.state != HostState::Up {
            return false;
        }

        if self.port.is_none() && self.port_state.is_none() && self.protocol.is_none() {
            return true;
        }

        report.ports.iter().any(|entry| {
            self.port.is_none_or(|p| entry.number == p)
                && self.port_state.is_none_or(|s| entry.state == s)
                && self.protocol.is_none_or(|p| entry.protocol == p)
        })
    }
}
