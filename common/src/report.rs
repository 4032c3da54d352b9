//! Typed model of what the engine reported about a host.

use std::fmt;
use std::net::IpAddr;

/// Overall reachability of a scanned host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    Up,
    Down,
    Unknown,
}

impl HostState {
    /// Maps the engine's `state` attribute. Anything unexpected is `Unknown`.
    pub fn from_engine(s: &str) -> Self {
        match s {
            "up" => HostState::Up,
            "down" => HostState::Down,
            _ => HostState::Unknown,
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostState::Up => write!(f, "up"),
            HostState::Down => write!(f, "down"),
            HostState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Port state as classified by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    Unfiltered,
    OpenFiltered,
    ClosedFiltered,
    Unknown,
}

impl PortState {
    pub fn from_engine(s: &str) -> Self {
        match s {
            "open" => PortState::Open,
            "closed" => PortState::Closed,
            "filtered" => PortState::Filtered,
            "unfiltered" => PortState::Unfiltered,
            "open|filtered" => PortState::OpenFiltered,
            "closed|filtered" => PortState::ClosedFiltered,
            _ => PortState::Unknown,
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::Closed => write!(f, "closed"),
            PortState::Filtered => write!(f, "filtered"),
            PortState::Unfiltered => write!(f, "unfiltered"),
            PortState::OpenFiltered => write!(f, "open|filtered"),
            PortState::ClosedFiltered => write!(f, "closed|filtered"),
            PortState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Transport protocol of a port table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
}

impl Protocol {
    pub fn from_engine(s: &str) -> Option<Self> {
        match s {
            "tcp" => Some(Protocol::Tcp),
            "udp" => Some(Protocol::Udp),
            "sctp" => Some(Protocol::Sctp),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// What the engine believes is listening behind a port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub product: Option<String>,
    pub version: Option<String>,
}

/// One row of a host's port table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortEntry {
    pub protocol: Protocol,
    pub number: u16,
    pub state: PortState,
    pub service: Option<Service>,
}

/// Everything the engine reported about a single host.
///
/// `partial` is set when expected blocks were damaged or missing, so
/// incomplete data is never silently presented as complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostReport {
    pub addr: IpAddr,
    pub hostname: Option<String>,
    pub state: HostState,
    pub ports: Vec<PortEntry>,
    pub partial: bool,
}

impl HostReport {
    pub fn new(addr: IpAddr, state: HostState) -> Self {
        Self {
            addr,
            hostname: None,
            state,
            ports: Vec::new(),
            partial: false,
        }
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortEntry> {
        self.ports.iter().filter(|p| p.state == PortState::Open)
    }
}
