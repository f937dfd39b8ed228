//! Human-readable report lines printed by the CLI.

use crate::types::{PortRange, ScanReport};

pub fn banner_line(target: &str, range: &PortRange) -> String {
    format!("Scanning {} ports on {}", range.len(), target)
}

pub fn elapsed_line(report: &ScanReport) -> String {
    format!(
        "Scan completed in {:.2} seconds.",
        report.elapsed.as_secs_f64()
    )
}

/// Open ports in ascending order, or the explicit "none" message.
pub fn result_line(report: &ScanReport) -> String {
    let ports = report.sorted_open_ports();
    if ports.is_empty() {
        return format!("No open ports found on {}.", report.target);
    }
    let list = ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Open ports on {}: {}", report.target, list)
}
