//! sol-hunter - Solana pair scanner
//!
//! `feed` scans DexScreener and writes ranked candidates to Redis.
//! `serve` exposes them over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use sol_hunter::adapters::cli::{CliApp, Command, FeedCmd, ServeCmd};
use sol_hunter::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use sol_hunter::adapters::http;
use sol_hunter::adapters::store::RedisStore;
use sol_hunter::application::{FeedConfig, FeedLoop, QueryConfig, QueryService};
use sol_hunter::config::{load_config, Config};
use sol_hunter::ports::{CandidateStore, PairSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets (UPSTASH_REDIS_URL, HELIUS_API_KEY) live in .env, not in the TOML file
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config_path = app
        .config
        .as_ref()
        .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).to_string()));
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Feed(cmd) => feed_command(cmd, config).await,
        Command::Serve(cmd) => serve_command(cmd, config).await,
    }
}

fn init_logging(verbose: bool, debug: bool, level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

async fn connect_store(config: &Config) -> Result<Arc<dyn CandidateStore>> {
    let timeout = Duration::from_secs(config.store.connect_timeout_secs);
    let store = RedisStore::connect(&config.store.url, timeout)
        .await
        .context("Failed to connect to candidate store")?;
    Ok(Arc::new(store))
}

fn build_source(config: &Config) -> Result<Arc<dyn PairSource>> {
    let client = DexScreenerClient::with_config(DexScreenerConfig::from(config))
        .context("Failed to create DexScreener client")?;
    Ok(Arc::new(client))
}

async fn feed_command(cmd: FeedCmd, config: Config) -> Result<()> {
    let store = connect_store(&config).await?;
    let source = build_source(&config)?;

    let mut feed_config = FeedConfig::from(&config);
    if let Some(secs) = cmd.interval {
        anyhow::ensure!(secs > 0, "--interval must be > 0");
        feed_config.interval = Duration::from_secs(secs);
    }

    let feed = Arc::new(FeedLoop::new(feed_config, source, store));

    if cmd.once {
        let report = feed.run_cycle().await;
        if let Some(err) = &report.fetch_error {
            tracing::warn!("Upstream fetch failed: {}", err);
        }
        println!(
            "fetched={} selected={} written={} blocked={} gated_out={} failed={} seq={}",
            report.fetched,
            report.selected,
            report.written,
            report.blocked,
            report.gated_out,
            report.failed,
            report
                .seq
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        return Ok(());
    }

    let handle = feed.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    feed.run().await;
    Ok(())
}

async fn serve_command(cmd: ServeCmd, config: Config) -> Result<()> {
    let store = connect_store(&config).await?;
    let source = build_source(&config)?;

    let query_config = QueryConfig::from(&config);
    tracing::info!(
        "Evaluate mode: {:?}, helius configured: {}",
        query_config.evaluate_mode,
        query_config.helius_configured
    );

    let service = Arc::new(QueryService::new(query_config, store, source));
    let bind = cmd.bind.unwrap_or_else(|| config.server.bind.clone());

    http::serve(service, &bind)
        .await
        .map_err(anyhow::Error::msg)
        .context("HTTP server failed")?;

    tracing::info!("sol-hunter server stopped");
    Ok(())
}
