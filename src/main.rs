use anyhow::{Context, Result};
use dotenvy::dotenv;
use popcorn::config::Config;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// The terminal belongs to the UI, so logs go to `<data_dir>/popcorn.log`.
fn init_tracing(data_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let appender = tracing_appender::rolling::never(data_dir, "popcorn.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let dotenv_outcome = dotenv();
    let config = Config::from_env()?;
    let _guard = init_tracing(&config.data_dir)?;
    match dotenv_outcome {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    info!(
        base_url = %config.omdb_base_url,
        data_dir = %config.data_dir.display(),
        debounce_ms = config.debounce.as_millis() as u64,
        "Starting popcorn"
    );
    popcorn::app::run(config).await
}
