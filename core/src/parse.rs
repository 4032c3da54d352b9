//! Engine output interpretation.
//!
//! The engine writes an XML document (`-oX -`) with one `<host>` record per
//! scanned host and nested port tables. This module extracts the typed
//! model out of that document without trusting it: damaged sections are
//! skipped and the affected report is flagged partial, so incomplete data
//! never masquerades as complete. A [`ParseError`] is raised only when the
//! input is not recognizable as engine output at all.
//!
//! Parsing is a pure function of the input; identical documents produce
//! identical reports.

use std::net::IpAddr;

use tracing::warn;

use drover_common::error::ParseError;
use drover_common::report::{HostReport, HostState, PortEntry, PortState, Protocol, Service};

/// Parses a full engine document into one report per host record.
pub fn parse_report(raw: &str) -> Result<Vec<HostReport>, ParseError> {
    let doc = raw.trim();
    if doc.is_empty() {
        return Err(ParseError::Empty);
    }
    if !doc.contains("<nmaprun") {
        return Err(ParseError::UnrecognizedFormat);
    }

    let mut reports = Vec::new();
    for block in element_blocks(doc, "host") {
        match parse_host_block(block) {
            Some(report) => reports.push(report),
            None => warn!("skipping host record without a usable address"),
        }
    }
    Ok(reports)
}

fn parse_host_block(block: &str) -> Option<HostReport> {
    // The record may carry several <address> elements (IP and MAC); the
    // first one that parses as an IP address wins.
    let addr: IpAddr = element_tags(block, "address")
        .into_iter()
        .find_map(|tag| extract_attr(tag, "addr")?.parse().ok())?;

    let mut partial = false;

    let state = match element_tag(block, "status").and_then(|t| extract_attr(t, "state")) {
        Some(s) => HostState::from_engine(s),
        None => {
            partial = true;
            HostState::Unknown
        }
    };

    let mut report = HostReport::new(addr, state);
    report.partial = partial;
    report.hostname = element_tag(block, "hostname")
        .and_then(|t| extract_attr(t, "name"))
        .map(unescape);

    for port_block in element_blocks(block, "port") {
        match parse_port_block(port_block) {
            Some(entry) => report.ports.push(entry),
            None => report.partial = true,
        }
    }

    Some(report)
}

fn parse_port_block(block: &str) -> Option<PortEntry> {
    let open_tag = element_tag(block, "port")?;
    let protocol = Protocol::from_engine(extract_attr(open_tag, "protocol")?)?;
    let number: u16 = extract_attr(open_tag, "portid")?.parse().ok()?;

    // A port entry without its <state> child is damaged, not "unknown".
    let state = element_tag(block, "state")
        .and_then(|t| extract_attr(t, "state"))
        .map(PortState::from_engine)?;

    let service = element_tag(block, "service").and_then(|tag| {
        extract_attr(tag, "name").map(|name| Service {
            name: unescape(name),
            product: extract_attr(tag, "product").map(unescape),
            version: extract_attr(tag, "version").map(unescape),
        })
    });

    Some(PortEntry {
        protocol,
        number,
        state,
        service,
    })
}

/// Finds the next `<name` occurrence that is a real tag start, so `<host`
/// never matches `<hostnames` or `<hosthint`.
fn find_tag_start(doc: &str, from: usize, name: &str) -> Option<usize> {
    let pat = format!("<{name}");
    let mut pos = from;
    while let Some(rel) = doc[pos..].find(&pat) {
        let start = pos + rel;
        let after = start + pat.len();
        match doc[after..].chars().next() {
            Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/' => return Some(start),
            _ => pos = after,
        }
    }
    None
}

/// Slices out every `<name ...> ... </name>` block. A trailing block with
/// no closing tag (truncated document) is dropped.
fn element_blocks<'a>(doc: &'a str, name: &str) -> Vec<&'a str> {
    let close_pat = format!("</{name}>");
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_tag_start(doc, pos, name) {
        match doc[start..].find(&close_pat) {
            Some(rel_close) => {
                let end = start + rel_close + close_pat.len();
                out.push(&doc[start..end]);
                pos = end;
            }
            None => break,
        }
    }
    out
}

/// Slices out every `<name ...>` opening (or self-closing) tag.
fn element_tags<'a>(doc: &'a str, name: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_tag_start(doc, pos, name) {
        let Some(rel_end) = doc[start..].find('>') else {
            break;
        };
        let end = start + rel_end + 1;
        out.push(&doc[start..end]);
        pos = end;
    }
    out
}

fn element_tag<'a>(doc: &'a str, name: &str) -> Option<&'a str> {
    let start = find_tag_start(doc, 0, name)?;
    let rel_end = doc[start..].find('>')?;
    Some(&doc[start..start + rel_end + 1])
}

/// Pulls `name="value"` out of a single tag slice.
fn extract_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let pat = format!("{name}=\"");
    let mut pos = 0;

    while let Some(rel) = tag[pos..].find(&pat) {
        let start = pos + rel;
        let value_start = start + pat.len();
        // Require a preceding separator so "portid" never matches "sportid".
        if tag[..start].ends_with(|c: char| c.is_ascii_whitespace()) {
            let value_end = tag[value_start..].find('"')?;
            return Some(&tag[value_start..value_start + value_end]);
        }
        pos = value_start;
    }
    None
}

/// Resolves the entity references the engine emits in attribute values.
fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
