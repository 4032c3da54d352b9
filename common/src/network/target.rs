//! # Scan Target Model
//!
//! Parses and resolves the possible inputs for a scan run:
//! * A single IP address (IPv4 or IPv6).
//! * A resolvable hostname.
//! * An IPv4 range (e.g., `192.168.1.1-100`).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A comma-separated list of any of the above.
//!
//! Validation is the only stage that performs name resolution; jobs built
//! afterwards carry concrete addresses exclusively.

use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use std::str::FromStr;

use tracing::debug;

use crate::error::TargetError;
use crate::network::range::{self, AddressSet, Ipv4Range};

/// Represents a distinct target to be scanned.
#[derive(Clone, Debug)]
pub enum Target {
    /// A single literal address.
    Host { target_addr: IpAddr },
    /// A hostname resolved at validation time.
    Name { hostname: String },
    /// A range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// Holds a list of different targets.
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = TargetError;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Host**: single IPv4/IPv6 address (e.g., "192.168.1.5", "::1").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **Name**: a plausible hostname (e.g., "scanme.example.org").
    /// * **List**: comma-separated combination of the above.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        // A '/' always means CIDR; errors there are authoritative.
        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_hostname(s) {
            return Ok(target);
        }

        Err(TargetError::Parse {
            spec: s.to_string(),
            reason: "not an address, range, CIDR block or hostname".to_string(),
        })
    }
}

/// Resolves one spec string all the way to concrete addresses, enforcing
/// the expansion cap.
pub fn resolve_spec(spec: &str, max_hosts: usize) -> Result<Vec<IpAddr>, TargetError> {
    let target: Target = spec.parse()?;
    to_addresses(target, max_hosts)
}

/// Converts a parsed target into its concrete address list.
///
/// The cap is checked against the symbolic size before any range is
/// materialized, so an oversized CIDR never allocates its expansion.
pub fn to_addresses(target: Target, max_hosts: usize) -> Result<Vec<IpAddr>, TargetError> {
    let mut set = AddressSet::new();
    resolve_into(target, &mut set)?;

    let requested = set.len();
    if requested > max_hosts as u64 {
        return Err(TargetError::TooManyHosts {
            requested,
            cap: max_hosts as u64,
        });
    }

    let addrs = set.expand();
    debug!("{} address(es) parsed from target spec", addrs.len());
    Ok(addrs)
}

/// Shared between single-target and multi-target resolution.
fn resolve_into(target: Target, set: &mut AddressSet) -> Result<(), TargetError> {
    match target {
        Target::Host { target_addr } => {
            set.add_single(target_addr);
        }
        Target::Range { ipv4_range } => {
            set.add_range(ipv4_range);
        }
        Target::Name { hostname } => {
            // Port 0 is a placeholder; only the addresses are kept.
            let resolved = (hostname.as_str(), 0u16)
                .to_socket_addrs()
                .map_err(|source| TargetError::Resolve {
                    host: hostname.clone(),
                    source,
                })?;
            for sock in resolved {
                set.add_single(sock.ip());
            }
        }
        Target::Multi { targets } => {
            for target in targets {
                resolve_into(target, set)?;
            }
        }
    }
    Ok(())
}

/// Parses a comma-separated list of targets (e.g., "192.168.1.5, 10.0.0.1-50").
fn parse_commas(s: &str) -> Result<Target, TargetError> {
    let mut targets = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        targets.push(Target::from_str(part)?);
    }

    if targets.is_empty() {
        return Err(TargetError::Empty);
    }

    Ok(Target::Multi { targets })
}

/// Parses a single literal IP address.
fn parse_host(s: &str) -> Option<Target> {
    s.parse::<IpAddr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
///
/// Only engages when the start side is a literal IPv4 address, so
/// hostnames containing dashes fall through to [`parse_hostname`].
fn parse_ip_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let Ok(start_addr) = start_str.parse::<Ipv4Addr>() else {
        return Ok(None);
    };

    let end_addr = parse_range_end_addr(end_str, &start_addr, s)?;

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Some(Target::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, TargetError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    let parse_err = |reason: String| TargetError::Parse {
        spec: original_s.to_string(),
        reason,
    };

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| parse_err(format!("invalid end of range '{end_str}': {e}")))?;

    if partial_octets.is_empty() {
        return Err(parse_err("end of range cannot be empty".to_string()));
    }
    if partial_octets.len() > 4 {
        return Err(parse_err(format!("end of range has too many octets: {end_str}")));
    }

    let partial_len = partial_octets.len();
    let start_index = 4 - partial_len;
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let parse_err = |reason: String| TargetError::Parse {
        spec: s.to_string(),
        reason,
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| parse_err(format!("invalid IP in CIDR '{ip_str}': {e}")))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| parse_err(format!("invalid prefix in CIDR '{prefix_str}': {e}")))?;

    let ipv4_range = range::cidr_range(ipv4_addr, prefix)?;

    Ok(Some(Target::Range { ipv4_range }))
}

/// Accepts strings that could plausibly be a hostname.
///
/// Labels follow LDH rules; the last label must not be all-numeric, which
/// keeps malformed addresses like "10.0.0.256" from masquerading as names.
fn parse_hostname(s: &str) -> Option<Target> {
    if s.len() > 253 {
        return None;
    }

    let labels: Vec<&str> = s.split('.').collect();
    let valid = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let last_numeric = labels
        .last()
        .is_some_and(|l| l.chars().all(|c| c.is_ascii_digit()));

    if !valid || last_numeric {
        return None;
    }

    Some(Target::Name {
        hostname: s.to_string(),
    })
}
