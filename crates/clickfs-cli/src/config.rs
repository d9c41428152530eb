use std::path::Path;

use clickfs_client::ClientConfig;
use serde::{Deserialize, Serialize};

/// File configuration for the `clickup` tool. Command-line flags and
/// environment variables override these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub mount: MountConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Comma-separated mount options, as for `-o`.
    pub options: String,
    /// Owner reported for every node; defaults to the mountpoint's owner.
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub attr_ttl_secs: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            options: String::new(),
            uid: None,
            gid: None,
            attr_ttl_secs: 1,
        }
    }
}

impl CliConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(&contents)?),
            "json" => Ok(serde_json::from_str(&contents)?),
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }

    /// The file at `path` if given, otherwise defaults, with the client
    /// section overlaid by the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.client = config.client.with_env();
        Ok(config)
    }
}
