use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use portsweep::config::{self, ScanConfig};
use portsweep::progress::{BarProgress, NoProgress, ProgressObserver};
use portsweep::{output, ports, scanner};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "portsweep",
    version,
    about = "Concurrent TCP connect scan of one host over a port range.",
    long_about = None
)]
struct Cli {
    /// Target hostname or IP. Extra words are joined with spaces; prompted for if omitted.
    target: Vec<String>,

    /// Port or inclusive port range to scan (e.g. 80 or 1-1024).
    #[arg(short, long, default_value = "1-1024")]
    ports: String,

    /// Number of concurrent workers. Defaults to min(50, ports/10 + 1).
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// Print the scan report as pretty JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Do not draw the progress bar.
    #[arg(long = "no-progress", default_value_t = false)]
    no_progress: bool,

    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let raw_target = if cli.target.is_empty() {
        prompt_target().context("failed to read target from stdin")?
    } else {
        cli.target.join(" ")
    };
    let target = config::normalize_target(&raw_target)?;

    let range = ports::parse_port_range(&cli.ports)
        .with_context(|| format!("invalid --ports value: {}", cli.ports))?;

    let mut config = ScanConfig::new(target)
        .with_range(range)
        .with_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(c) = cli.concurrency {
        config = config.with_concurrency(c);
    }

    if !cli.json {
        println!("{}", output::banner_line(&config.target, &config.range));
    }

    let observer: Arc<dyn ProgressObserver> = if cli.no_progress || cli.json {
        Arc::new(NoProgress)
    } else {
        Arc::new(BarProgress::new())
    };

    let report = scanner::run_scan(&config, observer)
        .await
        .with_context(|| format!("scan of {} failed", config.target))?;

    if cli.json {
        let stdout = io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &report)?;
        println!();
    } else {
        println!("\n{}", output::elapsed_line(&report));
        println!("{}", output::result_line(&report));
    }

    Ok(())
}

fn prompt_target() -> Result<String> {
    print!("Please provide a target IP address: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}
