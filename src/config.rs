//! Configuration and CLI argument handling

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "sync-timer")]
#[command(about = "A shared-session countdown/stopwatch client")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Display refresh cadence in milliseconds
    #[arg(long, default_value = "33")]
    pub tick_ms: u64,

    /// Path of the local preferences file (identity and remembered session)
    #[arg(long, default_value = ".sync-timer.json")]
    pub prefs: PathBuf,

    /// Session id to join on startup (overrides the remembered session)
    #[arg(short, long)]
    pub session: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Tick cadence as a duration; never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
