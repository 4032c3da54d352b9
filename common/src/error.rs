use thiserror::Error;

/// Failures while turning a target specification into concrete addresses.
///
/// Any of these means the job is never created.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("empty target specification")]
    Empty,

    #[error("invalid target '{spec}': {reason}")]
    Parse { spec: String, reason: String },

    #[error("failed to resolve '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("target expands to {requested} addresses, cap is {cap}")]
    TooManyHosts { requested: u64, cap: u64 },
}

/// Failures while interpreting the engine's output.
///
/// Raised only when the output is not recognizable as engine XML at all;
/// damaged sections inside an otherwise valid document are skipped and
/// flagged on the report instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty engine output")]
    Empty,

    #[error("output does not carry the engine XML signature")]
    UnrecognizedFormat,
}
