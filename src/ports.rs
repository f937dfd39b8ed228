use anyhow::{bail, Context, Result};

use crate::types::PortRange;

/// Parse a port range argument into a [`PortRange`] (1..=65535).
///
/// Supported formats:
/// - single port number: `80`
/// - inclusive range: `1-1024`
/// - surrounding whitespace is ignored
pub fn parse_port_range(s: &str) -> Result<PortRange> {
    let spec = s.trim();
    if spec.is_empty() {
        bail!("empty port range");
    }

    if let Some((a, b)) = spec.split_once('-') {
        let start = parse_port_str(a.trim())
            .with_context(|| format!("invalid start in range: {a}"))?;
        let end =
            parse_port_str(b.trim()).with_context(|| format!("invalid end in range: {b}"))?;
        if start > end {
            bail!("invalid range {start}-{end} (start > end)");
        }
        return Ok(PortRange::new(start, end)?);
    }

    let p = parse_port_str(spec).with_context(|| format!("invalid port value: {spec}"))?;
    Ok(PortRange::single(p)?)
}

/// Worker count used when none is given: one worker per ten ports plus one,
/// capped at 50.
pub fn default_concurrency(range: &PortRange) -> usize {
    (range.len() / 10 + 1).min(50)
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
