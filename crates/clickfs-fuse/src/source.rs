//! Remote data contract consumed by the handlers.
//!
//! Handlers only ever see [`RemoteSource`]. [`BlockingSource`] implements it
//! over the async [`ApiClient`] for the FUSE session thread.

use std::future::Future;

use clickfs_client::{ApiClient, ClientError};
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::Handle;

/// A remote record: JSON object keyed by field name.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("malformed {what}: {msg}")]
    Malformed { what: String, msg: String },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Read-only access to the remote service.
pub trait RemoteSource: Send + Sync {
    /// The authenticated user, as returned by the API (envelope included).
    fn user(&self) -> SourceResult<Record>;

    /// All teams, in the order the API lists them.
    fn teams(&self) -> SourceResult<Vec<Record>>;

    /// A single team, as returned by the API (envelope included).
    fn team(&self, id: &str) -> SourceResult<Record>;
}

/// Drives an [`ApiClient`] to completion on a tokio runtime.
///
/// Must be called from a thread that is not a runtime worker, which holds
/// for the FUSE session loop.
pub struct BlockingSource {
    client: ApiClient,
    runtime: Handle,
}

impl BlockingSource {
    pub fn new(client: ApiClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

impl RemoteSource for BlockingSource {
    fn user(&self) -> SourceResult<Record> {
        let value = self.block_on(self.client.user())?;
        into_record(value, "user")
    }

    fn teams(&self) -> SourceResult<Vec<Record>> {
        let value = self.block_on(self.client.teams())?;
        into_team_list(value)
    }

    fn team(&self, id: &str) -> SourceResult<Record> {
        let value = self.block_on(self.client.team(id))?;
        into_record(value, "team")
    }
}

pub(crate) fn into_record(value: Value, what: &str) -> SourceResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SourceError::Malformed {
            what: what.to_string(),
            msg: format!("expected an object, got {}", json_type(&other)),
        }),
    }
}

/// Accepts both the `{"teams": [...]}` envelope and a bare array.
pub(crate) fn into_team_list(value: Value) -> SourceResult<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("teams") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SourceError::Malformed {
                    what: "teams".to_string(),
                    msg: "missing \"teams\" array".to_string(),
                })
            }
        },
        other => {
            return Err(SourceError::Malformed {
                what: "teams".to_string(),
                msg: format!("expected an object or array, got {}", json_type(&other)),
            })
        }
    };

    items
        .into_iter()
        .map(|item| into_record(item, "team"))
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
