use std::path::PathBuf;

use github_notifier_shared::api::rest::{GitHubClient, RestError};
use tracing::{debug, info, warn};

pub mod cli;
pub mod config;
pub mod engine;
pub mod notify;
pub mod scheduler;
pub mod source;
pub mod token;
pub mod watermark;

pub use cli::Cli;
pub use config::{ClientConfig, load_config};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("set GITHUB_TOKEN env var or put the token in {}: {reason}", .path.display())]
    CredentialMissing { path: PathBuf, reason: String },
    #[error("failed to fetch notifications: {0}")]
    Fetch(#[from] RestError),
    #[error("failed to read watermark {}: {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to touch watermark {}: {source}", .path.display())]
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    init_tracing();

    let (cfg_path, cfg) = ClientConfig::find_and_load(cli.config)?;
    match &cfg_path {
        Some(path) => info!(path=?path, "loaded config"),
        None => info!("no config file found; using defaults"),
    }

    let home = config::home_dir()?;
    let watermark_path = cfg.watermark_path(&home);
    let tokens = token::TokenProvider::new(config::ENV_TOKEN, cfg.token_path(&home));
    let client = GitHubClient::new(&cfg.client_options())
        .map_err(|e| AppError::Config(format!("http client: {e}")))?;
    let filter = cfg.resolve_filter();

    info!(
        url = client.url(),
        filter = %filter,
        watermark = %watermark_path.display(),
        interval_secs = cfg.interval_secs,
        "starting notifier"
    );
    if cfg.http_timeout_secs.is_none() {
        debug!("no http timeout configured; a stalled request delays every later tick");
    }

    let mut poller = scheduler::Poller::new(
        tokens,
        Box::new(client),
        Box::new(watermark::FileWatermarkStore::new(watermark_path)),
        notify::default_sink(),
        filter,
    );
    let mut ticker = scheduler::IntervalTicker::new(cfg.interval());

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received; exiting");
        }
        _ = scheduler::run_scheduler(&mut ticker, &mut poller) => {
            info!("scheduler stopped");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(int), Ok(term)) => (int, term),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error=%e, "failed to install signal handlers");
                    return std::future::pending().await;
                }
            };
        tokio::select! {
            _ = sigint.recv() => {
                info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown: received Ctrl+C");
    }
}
