use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleetwatch::app::AppState;
use fleetwatch::config::FleetCfg;
use fleetwatch::dashboard::Refresher;
use fleetwatch::feed::DeviceFeed;
use fleetwatch::http;
use fleetwatch::readiness::{start_readiness_checks, Readiness};
use fleetwatch::service::DeviceService;
use fleetwatch::upstream::HttpDeviceFeed;

#[derive(Parser, Debug)]
#[command(name = "fleetwatch", about = "Fleet monitoring backend for construction equipment")]
struct Cli {
    /// Config file, instead of ./fleetwatch.toml
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    http_bind: Option<SocketAddr>,

    /// Base url of the device-data API
    #[arg(long)]
    upstream_url: Option<String>,

    /// Print the effective bind address and exit
    #[arg(long)]
    print_bind: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = FleetCfg::load(cli.config)?;
    if let Some(bind) = cli.http_bind {
        cfg.http.set_bind(bind);
    }
    if let Some(url) = cli.upstream_url {
        cfg.upstream.base_url = url;
    }
    cfg.validate()?;

    if cli.print_bind {
        println!("{}", cfg.http.bind());
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level)))
        .init();

    let cfg = Arc::new(cfg);
    let feed: Arc<dyn DeviceFeed> = Arc::new(HttpDeviceFeed::new(&cfg.upstream)?);
    let refresher = Refresher::spawn(
        DeviceService::new(feed.clone()),
        cfg.dashboard.refresh_interval(),
    );
    let state = AppState::new(cfg.clone(), feed, refresher.subscribe());
    start_readiness_checks(cfg.clone(), state.ready.clone());

    let listener = TcpListener::bind(cfg.http.bind()).await?;
    let addr = listener.local_addr()?;
    println!("listening on {addr}");
    info!(%addr, upstream = %cfg.upstream.base_url, "fleetwatch started");

    let shutdown = shutdown_signal(state.ready.clone(), cfg.health.drain());
    http::serve(listener, state, shutdown).await?;

    refresher.stop();
    info!("fleetwatch stopped");
    Ok(())
}

/// Resolves once SIGTERM or Ctrl-C arrived and the drain period has passed.
async fn shutdown_signal(ready: Arc<Readiness>, drain: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
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

    info!(drain_ms = drain.as_millis() as u64, "shutdown requested, draining");
    ready.start_draining();
    tokio::time::sleep(drain).await;
}
