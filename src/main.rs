//! health-console: dependency liveness probes exported to Prometheus

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;
use health_console::collectors::{self, Collector};
use health_console::config::{Config, ConsoleConfig};
use health_console::server::{AppState, HttpServer, shutdown_signal};
use health_console::utils::logging::init_tracing;
use health_console::{ProbeMetrics, PrometheusSink, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "health-console", version, about)]
struct Args {
    /// YAML configuration file; environment variables are used when absent
    #[arg(short, long, env = "HEALTH_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Port of the metrics server, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };
    if let Some(port) = args.port {
        config.console.server.port = port;
    }

    init_tracing(config.logging())?;
    info!(version = VERSION, "starting health console");

    let sink = Arc::new(PrometheusSink::new().context("failed to register metric families")?);
    let metrics = Arc::new(ProbeMetrics::new(sink.clone()));

    let collectors = build_collectors(&config.console, &metrics);
    if collectors.is_empty() {
        warn!("no collectors configured, only the HTTP endpoints are served");
    }
    for collector in &collectors {
        collector.start();
    }

    let state = AppState::new(sink, collectors.iter().map(Collector::name).collect());
    let server = HttpServer::new(config.server(), state).start()?;
    let handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let exited = tokio::select! {
        _ = shutdown_signal() => None,
        joined = &mut server_task => Some(joined),
    };

    join_all(collectors.iter().map(|collector| collector.stop())).await;

    match exited {
        None => {
            handle.stop(true).await;
            server_task.await?.context("HTTP server failed")?;
        }
        Some(joined) => {
            error!("HTTP server exited unexpectedly");
            joined?.context("HTTP server failed")?;
        }
    }

    info!("health console stopped");
    Ok(())
}

fn build_collectors(config: &ConsoleConfig, metrics: &Arc<ProbeMetrics>) -> Vec<Collector> {
    let mut built = Vec::new();

    let simple = [
        ("database", collectors::database_collector(config, metrics.clone())),
        ("registry", collectors::registry_collector(config, metrics.clone())),
        ("minio", collectors::object_store_collector(config, metrics.clone())),
    ];
    for (name, collector) in simple {
        match collector {
            Some(collector) => built.push(collector),
            None => info!(collector = name, "nothing configured, skipping collector"),
        }
    }

    match collectors::cluster_collector(config, metrics.clone()) {
        Ok(Some(collector)) => built.push(collector),
        Ok(None) => info!(collector = "cluster", "cluster probes disabled"),
        Err(e) => warn!(
            collector = "cluster",
            error = %e,
            "failed to create cluster client, skipping cluster probes"
        ),
    }

    built
}
