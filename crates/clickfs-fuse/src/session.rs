//! Mount session.
//!
//! Wires a [`RemoteSource`] into the router, the `VirtualFs` boundary and the
//! kernel bridge, then runs the `fuser` session loop until unmount.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span};

use crate::error::FsError;
use crate::filesystem::{ClickFs, ClickFsConfig};
use crate::mount::{options_to_fuser, validate_mountpoint, MountError, MountOptions};
use crate::router::Router;
use crate::source::RemoteSource;
use crate::vfs::VirtualFs;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("mount failed: {0}")]
    Mount(#[from] MountError),

    #[error("filesystem setup failed: {0}")]
    Setup(#[from] FsError),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mountpoint: PathBuf,
    pub mount_options: MountOptions,
    pub fs_config: ClickFsConfig,
}

impl SessionConfig {
    pub fn new(mountpoint: impl Into<PathBuf>, mount_options: MountOptions) -> Self {
        let fs_config = ClickFsConfig {
            direct_io: mount_options.direct_io,
            ..ClickFsConfig::default()
        };
        Self {
            mountpoint: mountpoint.into(),
            mount_options,
            fs_config,
        }
    }
}

/// Assemble the filesystem for `config` without mounting it.
pub fn build_filesystem(
    config: &SessionConfig,
    source: Arc<dyn RemoteSource>,
) -> Result<ClickFs, SessionError> {
    let router = Router::clickup(source, config.fs_config.owner)?;
    let span = info_span!("clickfs", mountpoint = %config.mountpoint.display());
    let vfs = VirtualFs::new(router, span);
    Ok(ClickFs::new(vfs, config.fs_config.clone()))
}

/// Mount and serve until the filesystem is unmounted. Blocks the calling
/// thread; run it off any async runtime worker.
pub fn mount_blocking(
    config: &SessionConfig,
    source: Arc<dyn RemoteSource>,
) -> Result<(), SessionError> {
    validate_mountpoint(&config.mountpoint)?;

    let fs = build_filesystem(config, source)?;
    let options = options_to_fuser(&config.mount_options);

    info!(
        mountpoint = %config.mountpoint.display(),
        routes = fs.vfs().router().len(),
        "mounting ClickFS"
    );
    fuser::mount2(fs, &config.mountpoint, &options).map_err(MountError::from)?;
    info!(mountpoint = %config.mountpoint.display(), "ClickFS unmounted");

    Ok(())
}
