use std::sync::Arc;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{normalize_target, ScanConfig};
use crate::error::{ScanError, ScanResult};
use crate::probe::{ProbeOutcome, Prober, TcpProber};
use crate::progress::{NoProgress, ProgressObserver};
use crate::queue::WorkQueue;
use crate::types::{PortRange, ScanReport};

/// Scan `range` on `target` with a plain TCP prober (1s timeout) and no
/// progress output.
pub async fn scan(target: &str, range: PortRange, concurrency: usize) -> ScanResult<ScanReport> {
    scan_with(
        target,
        range,
        concurrency,
        Arc::new(TcpProber::default()),
        Arc::new(NoProgress),
    )
    .await
}

/// Run a scan described by `config`, reporting progress to `observer`.
pub async fn run_scan(
    config: &ScanConfig,
    observer: Arc<dyn ProgressObserver>,
) -> ScanResult<ScanReport> {
    let workers = config.effective_concurrency()?;
    let prober = Arc::new(TcpProber::new(config.timeout));
    scan_with(&config.target, config.range, workers, prober, observer).await
}

/// Scan with an arbitrary prober.
///
/// - Every port of `range` is queued once and probed once.
/// - Exactly `concurrency` workers (capped at the range length) pull from
///   the queue, so at most that many probes are in flight.
/// - Returns after every worker has been joined and every port recorded.
pub async fn scan_with(
    target: &str,
    range: PortRange,
    concurrency: usize,
    prober: Arc<dyn Prober>,
    observer: Arc<dyn ProgressObserver>,
) -> ScanResult<ScanReport> {
    let target = normalize_target(target)?;
    if concurrency == 0 {
        return Err(ScanError::ZeroConcurrency);
    }
    let workers = concurrency.min(range.len());
    let total = range.len() as u64;

    let ctx = Arc::new(ScanContext {
        target: target.clone(),
        total,
        queue: WorkQueue::new(range.iter()),
        state: Mutex::new(ScanState::default()),
        prober,
        observer,
    });

    info!(host = %target, ports = %range, workers, "starting scan");
    let started_at = now_rfc3339();
    let start = Instant::now();
    ctx.observer.on_start(total);

    let mut set = JoinSet::new();
    for id in 0..workers {
        set.spawn(worker(id, ctx.clone()));
    }

    let mut failure: Option<tokio::task::JoinError> = None;
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            if failure.is_none() {
                warn!(error = %e, "scan worker failed, aborting remaining workers");
                set.abort_all();
                failure = Some(e);
            }
        }
    }
    if let Some(e) = failure {
        ctx.observer.on_finish();
        return Err(ScanError::Worker(e));
    }

    // Joining the workers is the completion point: a worker exits only on an
    // empty queue and acknowledges each port after recording it. The queue
    // barrier below is already released here and only confirms that.
    ctx.queue.join().await;
    let elapsed = start.elapsed();
    ctx.observer.on_finish();

    let (open_ports, scanned_done) = {
        let mut state = ctx.state.lock().await;
        (std::mem::take(&mut state.open_ports), state.scanned_done)
    };

    info!(
        host = %target,
        open = open_ports.len(),
        scanned = scanned_done,
        elapsed_ms = elapsed.as_millis() as u64,
        "scan finished"
    );

    Ok(ScanReport {
        target,
        range,
        concurrency: workers,
        open_ports,
        scanned_total: total,
        scanned_done,
        elapsed,
        started_at,
    })
}

/// State shared by all workers of one scan.
struct ScanContext {
    target: String,
    total: u64,
    queue: WorkQueue<u16>,
    state: Mutex<ScanState>,
    prober: Arc<dyn Prober>,
    observer: Arc<dyn ProgressObserver>,
}

/// Guarded by a single lock; never held across a probe.
#[derive(Debug, Default)]
struct ScanState {
    open_ports: Vec<u16>,
    scanned_done: u64,
}

async fn worker(id: usize, ctx: Arc<ScanContext>) {
    trace!(worker = id, "worker started");
    while let Some(ticket) = ctx.queue.pop().await {
        let port = *ticket.item();
        let outcome = ctx.prober.probe(&ctx.target, port).await;

        let done = {
            let mut state = ctx.state.lock().await;
            if outcome.is_open() {
                state.open_ports.push(port);
            }
            state.scanned_done += 1;
            state.scanned_done
        };
        ticket.done();

        match outcome {
            ProbeOutcome::Open => debug!(port, "port open"),
            ProbeOutcome::Closed(reason) => debug!(port, %reason, "port closed"),
        }
        ctx.observer.on_advance(done, ctx.total);
    }
    trace!(worker = id, "worker exiting, queue drained");
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
