use std::sync::Arc;

use tracing::warn;

use crate::attr::{AttrDefaults, FileAttr, NodeKind};
use crate::content::record_id;
use crate::error::Result;
use crate::handler::Handler;
use crate::source::RemoteSource;

/// `/teams`: one entry per team, named by team id.
///
/// The directory size is nominal and not derived from the listing.
pub struct TeamsHandler {
    source: Arc<dyn RemoteSource>,
    owner: AttrDefaults,
}

impl TeamsHandler {
    pub fn new(source: Arc<dyn RemoteSource>, owner: AttrDefaults) -> Self {
        Self { source, owner }
    }
}

impl Handler for TeamsHandler {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Directory
    }

    fn getattr(&self, _path: &str, _fh: Option<u64>) -> Result<FileAttr> {
        Ok(FileAttr::new_dir(self.owner))
    }

    fn readdir(&self, _path: &str, _fh: Option<u64>) -> Result<Vec<String>> {
        let teams = self.source.teams()?;
        let mut entries = Vec::with_capacity(teams.len() + 2);
        entries.push(".".to_string());
        entries.push("..".to_string());

        for team in &teams {
            match record_id(team) {
                Some(id) => entries.push(id),
                None => warn!("skipping team without a usable id: {:?}", team.get("id")),
            }
        }

        Ok(entries)
    }
}
