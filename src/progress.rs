use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives progress notifications from a running scan.
///
/// Calls are made outside the scan lock, so `done` values may arrive
/// slightly out of order across workers.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, _total: u64) {}
    fn on_advance(&self, _done: u64, _total: u64) {}
    fn on_finish(&self) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Terminal progress bar drawn on stderr.
#[derive(Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        let style = ProgressStyle::default_bar()
            .template("Scanning ports: {percent:>3}%|{bar:40.cyan/blue}| {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn on_advance(&self, _done: u64, _total: u64) {
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish();
    }
}
