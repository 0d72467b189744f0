//! Replay uploader entry point.

mod app;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = config::Cli::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting replaysync");

    let config = config::Config::load(&cli)?;
    tracing::info!(
        dir = %config.replay_dir,
        upload_all = config.upload_all,
        watch = config.watch,
        "configuration loaded"
    );

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config))?;

    tracing::info!("replaysync finished");
    Ok(())
}
