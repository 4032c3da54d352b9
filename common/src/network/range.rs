use std::net::{IpAddr, Ipv4Addr};

use crate::error::TargetError;

/// Inclusive range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Number of addresses in the range.
    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            return 0;
        }
        u64::from(end - start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }
}

/// Expands CIDR notation into the network..broadcast range.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, TargetError> {
    let network = ipnetwork::Ipv4Network::new(ip, prefix).map_err(|e| TargetError::Parse {
        spec: format!("{ip}/{prefix}"),
        reason: e.to_string(),
    })?;

    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Accumulates the concrete addresses a target resolves to.
///
/// Ranges are kept symbolic until [`AddressSet::expand`] so the expansion
/// cap can be enforced before any materialization happens.
#[derive(Debug, Default)]
pub struct AddressSet {
    singles: Vec<IpAddr>,
    ranges: Vec<Ipv4Range>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, addr: IpAddr) {
        self.singles.push(addr);
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.ranges.push(range);
    }

    /// Upper bound on the expansion size. Overlapping ranges are counted
    /// once per mention.
    pub fn len(&self) -> u64 {
        let ranged: u64 = self.ranges.iter().map(Ipv4Range::len).sum();
        ranged + self.singles.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }

    /// Materializes the distinct addresses, first-mention order preserved.
    pub fn expand(self) -> Vec<IpAddr> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();

        for addr in self
            .singles
            .into_iter()
            .chain(self.ranges.into_iter().flat_map(|r| r.to_iter().collect::<Vec<_>>()))
        {
            if seen.insert(addr) {
                out.push(addr);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_len_is_inclusive() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 4));
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn cidr_slash_30_spans_network_to_broadcast() {
        let range = cidr_range(Ipv4Addr::new(192, 168, 1, 0), 30).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 3));
    }

    #[test]
    fn oversized_prefix_is_rejected() {
        assert!(cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }

    #[test]
    fn expand_deduplicates_preserving_order() {
        let mut set = AddressSet::new();
        let dup = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        set.add_single(dup);
        set.add_range(Ipv4Range::new(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 3),
        ));

        let addrs = set.expand();
        assert_eq!(
            addrs,
            vec![
                dup,
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)),
            ]
        );
    }
}
