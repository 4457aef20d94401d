//! Entry point for jobcount_agent. Parses args, wires a job store and the
//! gauge registry into the monitor, and runs until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use jobcount_agent::config::{parse_args, AgentConfig, Command, JobSource};
use jobcount_agent::stop::install_shutdown_handler;
use jobcount_agent::store::{demo_jobs, FileJobStore, InMemoryJobStore};
use jobcount_agent::{Clock, CountingService, GaugeRegistry, JobCountMonitor, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match parse_args(std::env::args()) {
        Ok(Command::Run(cfg)) => cfg,
        Ok(Command::Help(text)) => {
            println!("{text}");
            return Ok(());
        }
        Err(e) => {
            eprintln!("jobcount_agent: {e}");
            std::process::exit(2);
        }
    };

    // Logs go to stderr so `--once` leaves stdout as plain JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let host = cfg.resolve_host();
    let stats = GaugeRegistry::new();
    match &cfg.source {
        JobSource::File(path) => {
            info!(path = %path.display(), %host, "counting jobs from file");
            run(FileJobStore::new(path.clone(), host), stats, &cfg).await
        }
        JobSource::Demo => {
            info!(%host, "counting jobs from demo table");
            let jobs = demo_jobs(&host, SystemClock.now_ms());
            run(InMemoryJobStore::with_jobs(host, jobs), stats, &cfg).await
        }
    }
}

async fn run<C: CountingService>(
    counter: C,
    stats: GaugeRegistry,
    cfg: &AgentConfig,
) -> anyhow::Result<()> {
    let monitor = JobCountMonitor::new(
        counter,
        Arc::new(stats.clone()),
        Arc::new(SystemClock),
        cfg.interval,
    );

    if cfg.once {
        monitor.sample_once().await;
        let js = serde_json::to_string_pretty(&stats.snapshot()).context("serialize gauges")?;
        println!("{js}");
        return Ok(());
    }

    // Handlers go in before the loop so an early SIGTERM still stops it cleanly.
    let _signals = install_shutdown_handler(monitor.stop_signal());
    let handle = monitor.start()?;
    handle.join().await?;
    info!(gauges = ?stats.snapshot().gauges, "job count monitor stopped");
    Ok(())
}
