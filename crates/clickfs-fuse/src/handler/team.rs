use std::sync::Arc;

use crate::attr::{AttrDefaults, FileAttr, NodeKind};
use crate::content::{canonical_bytes, unwrap_envelope};
use crate::error::{FsError, Result};
use crate::handler::{file_attr_for, read_slice, Handler};
use crate::source::RemoteSource;

/// `/teams/<id>`: a single team rendered as a JSON file.
pub struct TeamHandler {
    source: Arc<dyn RemoteSource>,
    owner: AttrDefaults,
}

impl TeamHandler {
    pub fn new(source: Arc<dyn RemoteSource>, owner: AttrDefaults) -> Self {
        Self { source, owner }
    }

    fn content(&self, path: &str) -> Result<Vec<u8>> {
        let id = team_id(path)?;
        let team = unwrap_envelope(self.source.team(id)?, "team");
        canonical_bytes(&team)
    }
}

/// Final path segment, the team id.
pub fn team_id(path: &str) -> Result<&str> {
    match path.trim_end_matches('/').rsplit('/').next() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(FsError::InvalidArgument {
            msg: format!("no team id in path {}", path),
        }),
    }
}

impl Handler for TeamHandler {
    fn name(&self) -> &'static str {
        "team"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::File
    }

    fn getattr(&self, path: &str, _fh: Option<u64>) -> Result<FileAttr> {
        Ok(file_attr_for(&self.content(path)?, self.owner))
    }

    fn read(&self, path: &str, length: u32, offset: u64, _fh: u64) -> Result<Vec<u8>> {
        Ok(read_slice(&self.content(path)?, length, offset))
    }
}
