//! The handler capability set and its concrete implementations.
//!
//! A [`Handler`] answers every filesystem operation for one kind of node.
//! The router picks the handler by path; the handler recomputes metadata and
//! content from the remote source on every call.
//!
//! Defaults encode the read-only policy: mutating operations fail with
//! [`FsError::NotSupported`], `access` and the flush/release family succeed,
//! and `statfs` reports constant stats.

mod root;
mod team;
mod teams;
mod user;

pub use root::RootHandler;
pub use team::TeamHandler;
pub use teams::TeamsHandler;
pub use user::UserHandler;

use std::time::SystemTime;

use crate::attr::{AttrDefaults, FileAttr, NodeKind};
use crate::content;
use crate::error::{FsError, Result};
use crate::operations::{wants_write, FsOp, FsStats, PLACEHOLDER_FH};

pub trait Handler: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Kind of node served. Static per handler; needs no remote call.
    fn kind(&self) -> NodeKind;

    fn getattr(&self, path: &str, fh: Option<u64>) -> Result<FileAttr>;

    fn readdir(&self, path: &str, _fh: Option<u64>) -> Result<Vec<String>> {
        Err(FsError::NotDirectory {
            path: path.to_string(),
        })
    }

    fn open(&self, _path: &str, flags: i32) -> Result<u64> {
        if wants_write(flags) {
            return not_supported(FsOp::Open);
        }
        Ok(PLACEHOLDER_FH)
    }

    fn read(&self, path: &str, _length: u32, _offset: u64, _fh: u64) -> Result<Vec<u8>> {
        Err(FsError::IsDirectory {
            path: path.to_string(),
        })
    }

    fn readlink(&self, path: &str) -> Result<String> {
        Err(FsError::InvalidArgument {
            msg: format!("{} is not a symlink", path),
        })
    }

    fn access(&self, _path: &str, _mask: i32) -> Result<()> {
        Ok(())
    }

    fn statfs(&self, _path: &str) -> Result<FsStats> {
        Ok(FsStats::default())
    }

    fn flush(&self, _path: &str, _fh: u64) -> Result<()> {
        Ok(())
    }

    fn release(&self, _path: &str, _fh: u64) -> Result<()> {
        Ok(())
    }

    fn fsync(&self, _path: &str, _datasync: bool, _fh: u64) -> Result<()> {
        Ok(())
    }

    fn write(&self, _path: &str, _data: &[u8], _offset: u64, _fh: u64) -> Result<u32> {
        not_supported(FsOp::Write)
    }

    fn create(&self, _path: &str, _mode: u32, _flags: i32) -> Result<u64> {
        not_supported(FsOp::Create)
    }

    fn mkdir(&self, _path: &str, _mode: u32) -> Result<()> {
        not_supported(FsOp::MkDir)
    }

    fn rmdir(&self, _path: &str) -> Result<()> {
        not_supported(FsOp::RmDir)
    }

    fn unlink(&self, _path: &str) -> Result<()> {
        not_supported(FsOp::Unlink)
    }

    fn rename(&self, _path: &str, _new_path: &str) -> Result<()> {
        not_supported(FsOp::Rename)
    }

    /// Create a symlink at `path` pointing to `target`.
    fn symlink(&self, _path: &str, _target: &str) -> Result<()> {
        not_supported(FsOp::Symlink)
    }

    /// Create a hard link to `path` named `new_path`.
    fn link(&self, _path: &str, _new_path: &str) -> Result<()> {
        not_supported(FsOp::Link)
    }

    fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
        not_supported(FsOp::Chmod)
    }

    fn chown(&self, _path: &str, _uid: Option<u32>, _gid: Option<u32>) -> Result<()> {
        not_supported(FsOp::Chown)
    }

    fn utimens(
        &self,
        _path: &str,
        _atime: Option<SystemTime>,
        _mtime: Option<SystemTime>,
    ) -> Result<()> {
        not_supported(FsOp::Utimens)
    }

    fn truncate(&self, _path: &str, _size: u64, _fh: Option<u64>) -> Result<()> {
        not_supported(FsOp::Truncate)
    }

    fn mknod(&self, _path: &str, _mode: u32, _rdev: u32) -> Result<()> {
        not_supported(FsOp::MkNod)
    }
}

pub(crate) fn not_supported<T>(op: FsOp) -> Result<T> {
    Err(FsError::NotSupported {
        op: op.as_str().to_string(),
    })
}

/// Attributes of a file node whose content is `content`.
pub(crate) fn file_attr_for(content: &[u8], owner: AttrDefaults) -> FileAttr {
    FileAttr::new_file(content.len() as u64, owner)
}

/// A read served from freshly rendered content.
pub(crate) fn read_slice(content: &[u8], length: u32, offset: u64) -> Vec<u8> {
    content::slice(content, offset, length).to_vec()
}
