//! Logging setup for the CLI.

use clap::{ArgAction, Args};
use tracing_subscriber::EnvFilter;

/// CLI config for the logging related subset of options.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Logs: filter directive
    ///
    /// Configures log severity level filter, by target. Simplest options:
    /// error, warn, info, debug, trace. Overridden by `-v`.
    #[arg(long = "log-filter", env = "LOG_FILTER", global = true)]
    pub log_filter: Option<String>,

    /// Logs: filter short-hand
    ///
    /// -v 'info', -vv 'debug', -vvv 'trace'
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl LoggingConfig {
    pub const DEFAULT_LOG_FILTER: &'static str = "warn";

    /// The effective filter directive.
    pub fn filter(&self) -> String {
        match self.verbose {
            0 => self
                .log_filter
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_LOG_FILTER.to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    /// Install a stderr `tracing` subscriber. Stdout is reserved for output.
    pub fn install(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(self.filter())?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
    }
}
