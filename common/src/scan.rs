//! Scan modes and the option set handed to the external engine.

use std::fmt;
use std::str::FromStr;

/// Named configuration of the external engine's behavior.
///
/// Each mode maps to a fixed set of engine flags; the engine itself decides
/// what the flags mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// Host discovery only, no port scan.
    Ping,
    /// Service version detection.
    Version,
    /// OS detection (requires privileges on most systems).
    Os,
    /// Raw SYN scan (requires privileges).
    Syn,
    /// Version detection plus default scripts.
    Default,
}

impl ScanMode {
    pub const ALL: [ScanMode; 5] = [
        ScanMode::Ping,
        ScanMode::Version,
        ScanMode::Os,
        ScanMode::Syn,
        ScanMode::Default,
    ];

    /// The engine flags this mode composes to.
    pub fn engine_args(&self) -> &'static [&'static str] {
        match self {
            ScanMode::Ping => &["-sn"],
            ScanMode::Version => &["-sV"],
            ScanMode::Os => &["-O"],
            ScanMode::Syn => &["-sS"],
            ScanMode::Default => &["-sV", "-sC"],
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ScanMode::Ping => "ping scan, host discovery only",
            ScanMode::Version => "service version detection",
            ScanMode::Os => "operating system detection",
            ScanMode::Syn => "raw SYN port scan",
            ScanMode::Default => "version detection with default scripts",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanMode::Ping => "ping",
            ScanMode::Version => "version",
            ScanMode::Os => "os",
            ScanMode::Syn => "syn",
            ScanMode::Default => "default",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ping" => Ok(ScanMode::Ping),
            "version" => Ok(ScanMode::Version),
            "os" => Ok(ScanMode::Os),
            "syn" => Ok(ScanMode::Syn),
            "default" => Ok(ScanMode::Default),
            other => Err(format!(
                "unknown scan mode '{other}', expected one of: ping, version, os, syn, default"
            )),
        }
    }
}

/// The composed option set for one job.
///
/// Exactly one of these exists per job; `to_args` yields the full engine
/// argument vector minus the target itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub mode: ScanMode,
}

impl ScanOptions {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }

    pub fn to_args(&self) -> Vec<String> {
        self.mode
            .engine_args()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
