use std::time::Duration;

use crate::error::{ScanError, ScanResult};
use crate::ports::default_concurrency;
use crate::probe::DEFAULT_TIMEOUT;
use crate::types::PortRange;

/// Trim a target host and reject it if nothing is left.
pub fn normalize_target(raw: &str) -> ScanResult<String> {
    let target = raw.trim();
    if target.is_empty() {
        return Err(ScanError::EmptyTarget);
    }
    Ok(target.to_string())
}

/// Everything needed to run one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub target: String,
    pub range: PortRange,
    /// `None` picks [`default_concurrency`] for the range.
    pub concurrency: Option<usize>,
    pub timeout: Duration,
}

impl ScanConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            range: PortRange::default(),
            concurrency: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_range(mut self, range: PortRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Worker count actually used: the explicit value or the heuristic,
    /// never more than the number of ports.
    pub fn effective_concurrency(&self) -> ScanResult<usize> {
        let requested = self
            .concurrency
            .unwrap_or_else(|| default_concurrency(&self.range));
        if requested == 0 {
            return Err(ScanError::ZeroConcurrency);
        }
        Ok(requested.min(self.range.len()))
    }
}
