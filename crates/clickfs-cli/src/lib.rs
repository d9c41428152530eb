//! The `clickup` command-line tool: API queries and the ClickFS mount.

pub mod cli;
pub mod config;
pub mod format;

pub use cli::{Cli, Command};
pub use config::CliConfig;
pub use format::{render, ObjectKind, OutputFormat};
