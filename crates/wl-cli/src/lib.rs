//! Work-log CLI library.
//!
//! This crate provides the CLI interface for logging WakaTime activity to Jira.

mod cli;
pub mod commands;
mod config;
pub mod prompt;
pub mod tracker;

pub use cli::{Cli, Commands, SourceArgs};
pub use config::Config;
