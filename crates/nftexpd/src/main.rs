//! nftexpd — Prometheus exporter for the live nftables ruleset.
//!
//! Serves `/metrics` over HTTP, loading a fresh ruleset snapshot for
//! every scrape, or prints one scrape and exits with `--run-once`.
//!
//! # Usage
//!
//! ```text
//! nftexpd --listen-port 12345
//! nftexpd --run-once
//! ```

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nftexp_ruleset::{NftCli, QueryConfig, RulesetLoader};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "nftexpd", about = "Prometheus nftables exporter", version)]
struct Cli {
    /// Print the metrics once and exit instead of serving them.
    #[arg(long)]
    run_once: bool,

    /// TCP port to serve the metrics endpoint on.
    #[arg(short = 'p', long, default_value = "12345")]
    listen_port: u16,

    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    listen_address: IpAddr,

    /// Path to the nft binary.
    #[arg(long, default_value = "nft")]
    nft_path: PathBuf,

    /// Upper bound on a single ruleset query, in seconds.
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    query_timeout: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = QueryConfig::new(&cli.nft_path)
        .with_timeout(Duration::from_secs(cli.query_timeout));
    let loader = RulesetLoader::new(Arc::new(NftCli::new(config)));

    if cli.run_once {
        return run_once(&loader).await;
    }

    serve(SocketAddr::new(cli.listen_address, cli.listen_port), loader).await
}

/// Scrape once and write the exposition text to stdout.
async fn run_once(loader: &RulesetLoader) -> anyhow::Result<()> {
    let text = nftexp_metrics::scrape(loader).await.map_err(|e| {
        error!(error = %e, "scrape failed");
        e
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn serve(addr: SocketAddr, loader: RulesetLoader) -> anyhow::Result<()> {
    let router = nftexp_api::build_router(loader);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "nftables exporter listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("nftables exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
