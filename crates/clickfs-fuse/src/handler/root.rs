use crate::attr::{AttrDefaults, FileAttr, NodeKind};
use crate::error::Result;
use crate::handler::Handler;

/// Entries of the mount root, after `.` and `..`.
pub const ROOT_ENTRIES: [&str; 2] = ["user", "teams"];

/// The mount root. Static; never touches the remote source.
pub struct RootHandler {
    owner: AttrDefaults,
}

impl RootHandler {
    pub fn new(owner: AttrDefaults) -> Self {
        Self { owner }
    }
}

impl Handler for RootHandler {
    fn name(&self) -> &'static str {
        "root"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Directory
    }

    fn getattr(&self, _path: &str, _fh: Option<u64>) -> Result<FileAttr> {
        Ok(FileAttr::new_dir(self.owner))
    }

    fn readdir(&self, _path: &str, _fh: Option<u64>) -> Result<Vec<String>> {
        let mut entries = vec![".".to_string(), "..".to_string()];
        entries.extend(ROOT_ENTRIES.iter().map(|e| e.to_string()));
        Ok(entries)
    }
}
