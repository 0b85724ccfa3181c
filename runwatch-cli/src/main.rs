//! Runwatch CLI
//!
//! Command-line interface for following Tekton pipeline runs and reading
//! their results, params, env vars and logs.

mod commands;
mod config;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use runwatch_tracker::TrackerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "runwatch")]
#[command(about = "Follow Tekton pipeline runs and read their outcomes", long_about = None)]
struct Cli {
    /// Kubernetes API server URL
    #[arg(long, env = "RUNWATCH_API_URL", default_value = "http://localhost:8001")]
    api_url: String,

    /// Bearer token for the API server
    #[arg(long, env = "RUNWATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Namespace the runs live in
    #[arg(short, long, env = "RUNWATCH_NAMESPACE", default_value = "default")]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runwatch=info,runwatch_tracker=info,runwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Ctrl-C aborts any pending wait
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending waits");
            token.cancel();
        }
    });

    let tracker = TrackerConfig::from_env()?;
    debug!(
        "Polling every {:?}, run timeout {:?}",
        tracker.poll_interval, tracker.run_timeout
    );

    let config = Config::new(&cli.api_url, cli.token, cli.namespace, tracker, cancel);

    handle_command(cli.command, &config).await
}
