use std::time::Duration;

/// Runtime configuration for a scan run.
///
/// Built once by the caller (the CLI) and passed down by reference;
/// the core never reads ambient state.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path or name of the external scan engine binary.
    pub binary: String,
    /// Number of concurrent worker tasks.
    pub workers: usize,
    /// Wall-clock limit for a single engine invocation.
    pub timeout: Duration,
    /// How many times a transiently failing job is re-executed.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub backoff_base: Duration,
    /// Upper bound on how many addresses one target spec may expand to.
    pub max_hosts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "nmap".to_string(),
            workers: 8,
            timeout: Duration::from_secs(120),
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
            max_hosts: 1024,
        }
    }
}
