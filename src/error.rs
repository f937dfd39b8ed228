use thiserror::Error;

/// Failures that abort a scan before or while the worker pool runs.
///
/// Per-port network failures never show up here; they are folded into
/// [`crate::probe::ProbeOutcome::Closed`].
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("target must not be empty")]
    EmptyTarget,

    #[error("invalid port range: {0}")]
    InvalidRange(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("scan worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type ScanResult<T> = Result<T, ScanError>;
