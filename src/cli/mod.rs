//! CLI module
//!
//! Singer-style command line. Without `--about`, `--discover` or `--test`
//! the tap runs a sync.
//!
//! # Flags
//!
//! - `--about [--format json|markdown]` - Package metadata and settings
//! - `--config <FILE|ENV>` - Settings, repeatable
//! - `--discover` - Print the catalog
//! - `--test [all|schema]` - Connection test or schema dump
//! - `--catalog <FILE>` - Stream and property selection
//! - `--state <FILE>` - Bookmarks from a previous run

mod commands;
mod runner;

pub use commands::{AboutFormat, Cli, TestMode};
pub use runner::Runner;
