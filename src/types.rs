use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

/// Inclusive range of TCP ports, always within `1..=65535` with `start <= end`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawPortRange")]
pub struct PortRange {
    start: u16,
    end: u16,
}

/// Unchecked wire form; deserialization goes through [`PortRange::new`].
#[derive(Deserialize)]
struct RawPortRange {
    start: u16,
    end: u16,
}

impl TryFrom<RawPortRange> for PortRange {
    type Error = ScanError;

    fn try_from(raw: RawPortRange) -> ScanResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> ScanResult<Self> {
        if start == 0 {
            return Err(ScanError::InvalidRange(format!(
                "port 0 is not scannable ({start}-{end})"
            )));
        }
        if start > end {
            return Err(ScanError::InvalidRange(format!(
                "{start}-{end} (start > end)"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(port: u16) -> ScanResult<Self> {
        Self::new(port, port)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range. Never zero.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self { start: 1, end: 1024 }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Outcome of one scan invocation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub target: String,
    pub range: PortRange,
    pub concurrency: usize,
    /// Open ports in the order workers recorded them.
    pub open_ports: Vec<u16>,
    pub scanned_total: u64,
    pub scanned_done: u64,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    pub started_at: String,
}

impl ScanReport {
    pub fn sorted_open_ports(&self) -> Vec<u16> {
        let mut ports = self.open_ports.clone();
        ports.sort_unstable();
        ports
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
