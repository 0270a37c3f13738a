use aws_subnet_exporter::config_loader::{self, CliOverrides};
use aws_subnet_exporter::inventory::Ec2Fetcher;
use aws_subnet_exporter::metrics::SubnetMetrics;
use aws_subnet_exporter::{poller, server};
use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{error, info};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Prometheus exporter for AWS subnet IP and /28 prefix availability
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML file with port, region, filter, period and debug keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The port to listen on for HTTP requests [default: 8080]
    #[arg(long)]
    port: Option<u16>,

    /// AWS region [default: eu-west-2]
    #[arg(long)]
    region: Option<String>,

    /// Glob matched against the subnet Name tag by the EC2 API (not a regex) [default: *]
    #[arg(long)]
    filter: Option<String>,

    /// Period between AWS polls, e.g. 60s or 5m [default: 60s]
    #[arg(long, value_parser = humantime::parse_duration)]
    period: Option<Duration>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            port: self.port,
            region: self.region.clone(),
            filter: self.filter.clone(),
            period: self.period,
            debug: self.debug,
        }
    }
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();
    let config = config_loader::resolve_config(args.config.as_deref(), &args.overrides())?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level())).init();

    if let Some(path) = &args.config {
        info!("Configuration file: {:?}", path);
    }
    info!(
        "Starting aws-subnet-exporter: port={} region={} filter={:?} period={:?} endpoint={}",
        config.port,
        config.region,
        config.filter,
        config.period,
        server::METRICS_ENDPOINT
    );

    let fetcher = Ec2Fetcher::from_env(&config.region).await;
    let metrics = Arc::new(SubnetMetrics::new().wrap_err("Failed to create metrics registry")?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut poller_task = {
        let metrics = metrics.clone();
        let filter = config.filter.clone();
        let period = config.period;
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { poller::run(&fetcher, &metrics, &filter, period, shutdown).await })
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let mut server_task = tokio::spawn(server::serve(addr, metrics, shutdown_rx));

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Whichever task ends first decides the exit status; the other is then
    // drained so a clean shutdown waits for both.
    tokio::select! {
        result = &mut poller_task => {
            if let Ok(Err(e)) = &result {
                error!("Subnet poller failed: {}", e);
            }
            result
                .wrap_err("Subnet poller task panicked")?
                .wrap_err("Subnet poller stopped")?;
            server_task
                .await
                .wrap_err("Metrics web server task panicked")?
                .wrap_err("Metrics web server failed")?;
        }
        result = &mut server_task => {
            result
                .wrap_err("Metrics web server task panicked")?
                .wrap_err("Metrics web server failed")?;
            if !poller_task.is_finished() {
                return Err(eyre!("Metrics web server stopped while the poller was still running"));
            }
            poller_task
                .await
                .wrap_err("Subnet poller task panicked")?
                .wrap_err("Subnet poller stopped")?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}
