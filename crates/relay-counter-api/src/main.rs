//! # relay-counter — Binary Entry Point
//!
//! Parses configuration from flags and environment, installs structured
//! tracing, and serves the ingestion API until SIGINT or SIGTERM.
//! Counts are kept in the in-memory store.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use relay_counter_api::auth::AuthorizedKeys;
use relay_counter_api::state::{AppConfig, DEFAULT_PORT};
use relay_counter_api::Server;
use relay_counter_core::{MemoryStore, RecordStore};

/// Relay Counter — authenticated ingestion endpoint for relay usage counts.
#[derive(Parser, Debug)]
#[command(name = "relay-counter", version, about, long_about = None)]
struct Cli {
    /// Port to listen on (all interfaces).
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Comma-separated API keys accepted in the Authorization header.
    #[arg(long, env = "API_KEYS", value_delimiter = ',')]
    api_keys: Vec<String>,

    /// Seconds to let in-flight requests finish after a shutdown signal.
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    shutdown_grace_secs: u64,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Blank entries in the key list are dropped, so a trailing comma never
    /// authorizes header-less requests.
    fn into_config(self) -> AppConfig {
        let keys = self
            .api_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        AppConfig {
            port: self.port,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
            authorized_keys: AuthorizedKeys::enabled(keys),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config();
    if config.authorized_keys.is_empty() {
        tracing::warn!("no API keys configured; every request except the health check will be rejected");
    }
    tracing::debug!(?config, "configuration loaded");

    let store = Arc::new(MemoryStore::new());
    tracing::info!(backend = store.backend_name(), "record store ready");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let reason = Server::new(config, store)
        .run(shutdown)
        .await
        .context("relay counter server failed")?;

    tracing::info!(%reason, "relay counter stopped");
    Ok(())
}

/// Cancel `shutdown` on CTRL+C (SIGINT) or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received CTRL+C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }

    shutdown.cancel();
}
