//! Mount point handling for ClickFS.
//!
//! Option parsing, mountpoint validation, and conversion to `fuser` options.
//! The mount is always read-only; `rw` is rejected rather than ignored.

use std::path::Path;

use thiserror::Error;

pub const FS_NAME: &str = "clickfs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    pub allow_other: bool,
    pub allow_root: bool,
    pub default_permissions: bool,
    pub auto_unmount: bool,
    /// Bypass the page cache so every read reaches the remote source.
    pub direct_io: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        MountOptions {
            allow_other: false,
            allow_root: false,
            default_permissions: false,
            auto_unmount: true,
            direct_io: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn validate_mountpoint(path: &Path) -> Result<(), MountError> {
    if !path.exists() {
        return Err(MountError::PathNotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(MountError::NotADirectory(path.display().to_string()));
    }

    Ok(())
}

/// Parse a comma-separated option string as given to `mount -o`.
///
/// Accepted: allow_other, allow_root, default_permissions, auto_unmount,
/// noauto_unmount, direct_io, ro.
pub fn parse_mount_options(opts_str: &str) -> Result<MountOptions, MountError> {
    let mut options = MountOptions::default();

    for opt in opts_str.split(',') {
        match opt.trim() {
            "allow_other" => options.allow_other = true,
            "allow_root" => options.allow_root = true,
            "default_permissions" => options.default_permissions = true,
            "auto_unmount" => options.auto_unmount = true,
            "noauto_unmount" => options.auto_unmount = false,
            "direct_io" => options.direct_io = true,
            "ro" | "" => {}
            other => return Err(MountError::InvalidOption(other.to_string())),
        }
    }

    if options.allow_other && options.allow_root {
        return Err(MountError::InvalidOption(
            "allow_other and allow_root are mutually exclusive".to_string(),
        ));
    }

    Ok(options)
}

pub fn options_to_fuser(opts: &MountOptions) -> Vec<fuser::MountOption> {
    let mut fuser_opts = vec![
        fuser::MountOption::RO,
        fuser::MountOption::FSName(FS_NAME.to_string()),
        fuser::MountOption::Subtype(FS_NAME.to_string()),
    ];

    if opts.allow_other {
        fuser_opts.push(fuser::MountOption::AllowOther);
    }

    if opts.allow_root {
        fuser_opts.push(fuser::MountOption::AllowRoot);
    }

    if opts.default_permissions {
        fuser_opts.push(fuser::MountOption::DefaultPermissions);
    }

    if opts.auto_unmount {
        fuser_opts.push(fuser::MountOption::AutoUnmount);
    }

    fuser_opts
}
