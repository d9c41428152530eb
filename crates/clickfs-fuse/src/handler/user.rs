use std::sync::Arc;

use crate::attr::{AttrDefaults, FileAttr, NodeKind};
use crate::content::{canonical_bytes, unwrap_envelope};
use crate::error::Result;
use crate::handler::{file_attr_for, read_slice, Handler};
use crate::source::RemoteSource;

/// `/user`: the authenticated user rendered as a JSON file.
///
/// Every `getattr` and `read` fetches the user again; the size reported by
/// one call and the bytes returned by the next agree only while the remote
/// record is unchanged.
pub struct UserHandler {
    source: Arc<dyn RemoteSource>,
    owner: AttrDefaults,
}

impl UserHandler {
    pub fn new(source: Arc<dyn RemoteSource>, owner: AttrDefaults) -> Self {
        Self { source, owner }
    }

    fn content(&self) -> Result<Vec<u8>> {
        let user = unwrap_envelope(self.source.user()?, "user");
        canonical_bytes(&user)
    }
}

impl Handler for UserHandler {
    fn name(&self) -> &'static str {
        "user"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::File
    }

    fn getattr(&self, _path: &str, _fh: Option<u64>) -> Result<FileAttr> {
        Ok(file_attr_for(&self.content()?, self.owner))
    }

    fn read(&self, _path: &str, length: u32, offset: u64, _fh: u64) -> Result<Vec<u8>> {
        Ok(read_slice(&self.content()?, length, offset))
    }
}
