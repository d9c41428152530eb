//! ClickFS REST client.
//!
//! Thin async wrapper over the ClickUp v1 API used by both the filesystem
//! and the `clickup` command-line tool.

pub mod client;
pub mod config;
pub mod error;
pub mod query;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use query::TaskQuery;
