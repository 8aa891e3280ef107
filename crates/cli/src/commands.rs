//! CLI commands.

use clap::{Subcommand, ValueEnum};
use corelib::{PartitionBoundary, SplitKey};
use serde_json::Value;
use splitter::{JsonFileSource, Namespace, NamespaceSummary, ShardedSplitter};
use std::sync::Arc;

/// How `bounds` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `{min, max}` document per line
    Json,
    /// A pretty-printed array of `{min, max}` documents
    Pretty,
    /// One range filter on the leading split-key field per line
    Filters,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the partition bounds of a sharded collection
    Bounds {
        /// Collection namespace, `<database>.<collection>`
        #[arg(long, short = 'n')]
        namespace: Namespace,

        /// Split key: a field, or leading shard-key fields separated by commas
        #[arg(long, short = 'k')]
        split_key: SplitKey,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Do not check the split key against the shard key
        #[arg(long)]
        no_prefix_check: bool,
    },

    /// List the namespaces of the export with their chunk counts
    Inspect,
}

/// Output of a command.
#[derive(Debug)]
pub enum CommandResult {
    Bounds {
        bounds: Vec<PartitionBoundary>,
        format: OutputFormat,
    },
    Namespaces(Vec<NamespaceSummary>),
}

impl Command {
    pub async fn execute(&self, source: Arc<JsonFileSource>) -> anyhow::Result<CommandResult> {
        match self {
            Command::Bounds {
                namespace,
                split_key,
                format,
                no_prefix_check,
            } => {
                let bounds = ShardedSplitter::new(source)
                    .with_prefix_check(!no_prefix_check)
                    .split_bounds(namespace, split_key)
                    .await?;
                Ok(CommandResult::Bounds {
                    bounds,
                    format: *format,
                })
            }
            Command::Inspect => Ok(CommandResult::Namespaces(source.summary().await?)),
        }
    }
}

impl CommandResult {
    pub fn render(&self) -> anyhow::Result<String> {
        match self {
            CommandResult::Bounds { bounds, format } => match format {
                OutputFormat::Json => lines(bounds.iter().map(|b| Value::Object(b.to_document()))),
                OutputFormat::Pretty => Ok(serde_json::to_string_pretty(bounds)?),
                OutputFormat::Filters => lines(bounds.iter().map(|b| Value::Object(b.to_filter()))),
            },
            CommandResult::Namespaces(summaries) => Ok(summaries
                .iter()
                .map(|s| match &s.shard_key {
                    Some(key) => format!("{}\t{} chunk(s)\tshard key {}", s.namespace, s.chunks, key),
                    None => format!("{}\t{} chunk(s)", s.namespace, s.chunks),
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

fn lines(values: impl Iterator<Item = Value>) -> anyhow::Result<String> {
    let mut out = Vec::new();
    for value in values {
        out.push(serde_json::to_string(&value)?);
    }
    Ok(out.join("\n"))
}
