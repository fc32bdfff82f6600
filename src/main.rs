//! Sync Timer - a shared-session countdown/stopwatch client
//!
//! This is the main entry point for the sync-timer application.

use tracing::info;

use sync_timer::{config::Config, store::MemoryStore, ui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Log to stderr so the live display on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(format!("sync_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting sync-timer v0.1.0");
    info!(
        "Configuration: tick={}ms, prefs={}",
        config.tick_ms,
        config.prefs.display()
    );

    let store = MemoryStore::new();
    ui::run(&config, store).await?;

    info!("Shutdown complete");
    Ok(())
}
