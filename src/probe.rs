use std::fmt;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{self, TcpStream};
use tokio::time;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of a single connect probe.
///
/// Every failure is a `Closed`; the reason is kept for logging only and
/// callers are expected to treat all reasons the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Closed(ClosedReason),
}

impl ProbeOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    Unresolved,
    Refused,
    TimedOut,
    InvalidPort,
    Other,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClosedReason::Unresolved => "host did not resolve",
            ClosedReason::Refused => "connection refused",
            ClosedReason::TimedOut => "timed out",
            ClosedReason::InvalidPort => "invalid port",
            ClosedReason::Other => "transport error",
        };
        f.write_str(s)
    }
}

/// Something that can tell whether `target:port` accepts connections.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &str, port: u16) -> ProbeOutcome;
}

/// Plain TCP connect prober.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: &str, port: u16) -> ProbeOutcome {
        probe(target, port, self.timeout).await
    }
}

/// Attempt one TCP connection to `target:port` within `timeout`.
///
/// Name resolution and the connect share the timeout. The stream is closed
/// as soon as the handshake completes.
pub async fn probe(target: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    if port == 0 {
        return ProbeOutcome::Closed(ClosedReason::InvalidPort);
    }

    match time::timeout(timeout, connect_once(target, port)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            ProbeOutcome::Open
        }
        Ok(Err(reason)) => ProbeOutcome::Closed(reason),
        Err(_) => ProbeOutcome::Closed(ClosedReason::TimedOut),
    }
}

async fn connect_once(target: &str, port: u16) -> Result<TcpStream, ClosedReason> {
    let addrs: Vec<SocketAddr> = net::lookup_host((target, port))
        .await
        .map_err(|_| ClosedReason::Unresolved)?
        .collect();
    // IPv4 first, fall back to whatever the resolver returned.
    let addr = addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or(ClosedReason::Unresolved)?;

    TcpStream::connect(addr).await.map_err(|e| match e.kind() {
        ErrorKind::ConnectionRefused => ClosedReason::Refused,
        ErrorKind::TimedOut => ClosedReason::TimedOut,
        _ => ClosedReason::Other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn port_zero_is_closed_without_network() {
        let out = probe("127.0.0.1", 0, Duration::from_millis(100)).await;
        assert_eq!(out, ProbeOutcome::Closed(ClosedReason::InvalidPort));
    }

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let out = probe("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(out.is_open());
    }

    #[tokio::test]
    async fn released_port_is_closed() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let out = probe("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(!out.is_open());
    }

    #[tokio::test]
    async fn unresolvable_host_is_closed() {
        let out = probe("no-such-host.invalid", 80, Duration::from_millis(500)).await;
        assert!(matches!(
            out,
            ProbeOutcome::Closed(ClosedReason::Unresolved | ClosedReason::TimedOut)
        ));
    }
}
