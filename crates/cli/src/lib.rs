//! CLI tool for computing partition bounds of sharded collections.
//!
//! Provides commands for:
//! - Printing split bounds for a namespace from a chunk metadata export
//! - Inspecting which namespaces an export contains

pub mod commands;
pub mod config;
pub mod logging;

pub use commands::{Command, CommandResult, OutputFormat};
pub use config::CliConfig;
