use std::time::Duration;

use colored::*;
use drover_common::report::{HostReport, HostState, PortEntry, PortState};

pub fn state_value(state: HostState) -> ColoredString {
    match state {
        HostState::Up => "up".green().bold(),
        HostState::Down => "down".red(),
        HostState::Unknown => "unknown".yellow(),
    }
}

pub fn port_key(entry: &PortEntry) -> String {
    format!("{}/{}", entry.protocol, entry.number)
}

pub fn port_value(entry: &PortEntry) -> ColoredString {
    let state = match entry.state {
        PortState::Open => entry.state.to_string().green().bold(),
        PortState::Closed => entry.state.to_string().red(),
        _ => entry.state.to_string().yellow(),
    };

    let service = entry.service.as_ref().map(|svc| {
        let mut label = svc.name.clone();
        if let Some(product) = &svc.product {
            label.push_str(&format!(" ({product}"));
            if let Some(version) = &svc.version {
                label.push_str(&format!(" {version}"));
            }
            label.push(')');
        }
        label
    });

    match service {
        Some(label) => format!("{} {}", state, label.normal()).normal(),
        None => state,
    }
}

/// Key/value rows for one host's detail tree.
pub fn host_details(report: &HostReport) -> Vec<(String, ColoredString)> {
    let mut details: Vec<(String, ColoredString)> = Vec::new();
    details.push(("state".to_string(), state_value(report.state)));

    if report.partial {
        details.push(("note".to_string(), "partial report".yellow()));
    }

    for entry in &report.ports {
        details.push((port_key(entry), port_value(entry)));
    }

    details
}

pub fn elapsed(total: Duration) -> ColoredString {
    format!("{:.2}s", total.as_secs_f64()).bold().yellow()
}
