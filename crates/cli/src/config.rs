//! Command line configuration.

use crate::commands::Command;
use crate::logging::LoggingConfig;
use clap::Parser;
use splitter::JsonFileSource;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Compute partition bounds for parallel reads of sharded collections.
#[derive(Debug, Parser)]
#[command(name = "splitter", version)]
pub struct CliConfig {
    /// Export of the `config.chunks` collection (JSON array or one document per line)
    #[arg(long, env = "SPLITTER_CHUNKS")]
    pub chunks: PathBuf,

    /// Export of the `config.collections` collection, used for shard keys
    #[arg(long, env = "SPLITTER_COLLECTIONS", global = true)]
    pub collections: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// The metadata source described by this configuration.
    pub fn source(&self) -> JsonFileSource {
        let source = JsonFileSource::new(&self.chunks);
        match &self.collections {
            Some(path) => source.with_collections(path),
            None => source,
        }
    }

    /// Install logging, execute the command and print its result to stdout.
    pub fn run(self) -> anyhow::Result<()> {
        self.logging.install()?;
        debug!(command = ?self.command, chunks = %self.chunks.display(), "executing command");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let result = runtime.block_on(self.command.execute(Arc::new(self.source())))?;

        println!("{}", result.render()?);
        Ok(())
    }
}
