pub mod check;
pub mod modes;
pub mod scan;

use clap::{ArgAction, Args, Parser, Subcommand};
use drover_common::network::target::Target;
use drover_common::scan::ScanMode;

#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Drives an external scan engine across many targets.")]
#[command(version)]
pub struct CommandLine {
    /// Reduce output; repeat to also silence per-host detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one or more targets
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// List the available scan modes
    #[command(alias = "m")]
    Modes,
    /// Verify the engine binary is available
    #[command(alias = "c")]
    Check {
        /// Engine binary to probe
        #[arg(long, default_value = "nmap")]
        engine: String,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// Target spec: IP, hostname, CIDR block, range, or comma list
    pub target: Target,

    /// Scan mode handed to the engine
    #[arg(short, long, default_value = "default")]
    pub mode: ScanMode,

    /// Write results to a timestamped file when the run ends
    #[arg(short, long)]
    pub save: bool,

    /// Engine binary to invoke
    #[arg(long, default_value = "nmap")]
    pub engine: String,

    /// Concurrent engine invocations
    #[arg(long, default_value_t = 8)]
    pub workers: usize,

    /// Per-job wall-clock limit in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,

    /// Retries per job on transient failure
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Refuse target specs expanding past this many addresses
    #[arg(long, default_value_t = 1024)]
    pub max_hosts: usize,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
