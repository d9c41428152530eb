//! Path-based filesystem boundary.
//!
//! [`VirtualFs`] is the only entry point the kernel bridge uses. Every
//! operation runs through [`VirtualFs::dispatch`], which routes the path,
//! invokes the handler inside the injected span, logs the outcome, and
//! translates errors into an [`Errno`]. No [`FsError`] leaves this module.

use std::time::SystemTime;

use tracing::{debug, warn, Span};

use crate::attr::{FileAttr, NodeKind};
use crate::error::{Errno, FsError, Result};
use crate::handler::Handler;
use crate::operations::{FsOp, FsStats};
use crate::router::Router;

pub type VfsResult<T> = std::result::Result<T, Errno>;

/// Short description of an operation result for the log line.
pub trait Outcome {
    fn summary(&self) -> String;
}

impl Outcome for () {
    fn summary(&self) -> String {
        "ok".to_string()
    }
}

impl Outcome for u64 {
    fn summary(&self) -> String {
        format!("fh={}", self)
    }
}

impl Outcome for u32 {
    fn summary(&self) -> String {
        format!("written={}", self)
    }
}

impl Outcome for FileAttr {
    fn summary(&self) -> String {
        format!("kind={:?} size={} mode={:o}", self.kind, self.size, self.mode())
    }
}

impl Outcome for Vec<String> {
    fn summary(&self) -> String {
        format!("entries={}", self.len())
    }
}

impl Outcome for Vec<u8> {
    fn summary(&self) -> String {
        format!("bytes={}", self.len())
    }
}

impl Outcome for String {
    fn summary(&self) -> String {
        format!("target={}", self)
    }
}

impl Outcome for FsStats {
    fn summary(&self) -> String {
        format!("blocks={} files={}", self.blocks, self.files)
    }
}

pub struct VirtualFs {
    router: Router,
    span: Span,
}

impl VirtualFs {
    /// `span` is the logging context every operation is recorded under.
    pub fn new(router: Router, span: Span) -> Self {
        Self { router, span }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    fn dispatch<T, F>(&self, op: FsOp, path: &str, call: F) -> VfsResult<T>
    where
        T: Outcome,
        F: FnOnce(&dyn Handler) -> Result<T>,
    {
        let _entered = self.span.enter();

        let result = self
            .router
            .resolve(op, path)
            .and_then(|handler| call(handler.as_ref()));

        match result {
            Ok(value) => {
                debug!(op = op.as_str(), path, result = %value.summary(), "fs op");
                Ok(value)
            }
            Err(err) => {
                let errno = Errno::from(&err);
                let mutating = op.is_mutating();
                if expected_failure(op, &err) {
                    debug!(op = op.as_str(), path, mutating, errno = errno.0, error = %err, "fs op refused");
                } else {
                    warn!(op = op.as_str(), path, mutating, errno = errno.0, error = %err, "fs op failed");
                }
                Err(errno)
            }
        }
    }

    /// Kind of the node at `path` without contacting the remote source.
    pub fn kind(&self, path: &str) -> Option<NodeKind> {
        self.router
            .resolve(FsOp::GetAttr, path)
            .ok()
            .map(|handler| handler.kind())
    }

    pub fn getattr(&self, path: &str, fh: Option<u64>) -> VfsResult<FileAttr> {
        self.dispatch(FsOp::GetAttr, path, |h| h.getattr(path, fh))
    }

    pub fn readdir(&self, path: &str, fh: Option<u64>) -> VfsResult<Vec<String>> {
        self.dispatch(FsOp::ReadDir, path, |h| h.readdir(path, fh))
    }

    pub fn open(&self, path: &str, flags: i32) -> VfsResult<u64> {
        self.dispatch(FsOp::Open, path, |h| h.open(path, flags))
    }

    pub fn read(&self, path: &str, length: u32, offset: u64, fh: u64) -> VfsResult<Vec<u8>> {
        self.dispatch(FsOp::Read, path, |h| h.read(path, length, offset, fh))
    }

    pub fn readlink(&self, path: &str) -> VfsResult<String> {
        self.dispatch(FsOp::ReadLink, path, |h| h.readlink(path))
    }

    pub fn access(&self, path: &str, mask: i32) -> VfsResult<()> {
        self.dispatch(FsOp::Access, path, |h| h.access(path, mask))
    }

    pub fn statfs(&self, path: &str) -> VfsResult<FsStats> {
        self.dispatch(FsOp::StatFs, path, |h| h.statfs(path))
    }

    pub fn flush(&self, path: &str, fh: u64) -> VfsResult<()> {
        self.dispatch(FsOp::Flush, path, |h| h.flush(path, fh))
    }

    pub fn release(&self, path: &str, fh: u64) -> VfsResult<()> {
        self.dispatch(FsOp::Release, path, |h| h.release(path, fh))
    }

    pub fn fsync(&self, path: &str, datasync: bool, fh: u64) -> VfsResult<()> {
        self.dispatch(FsOp::Fsync, path, |h| h.fsync(path, datasync, fh))
    }

    pub fn write(&self, path: &str, data: &[u8], offset: u64, fh: u64) -> VfsResult<u32> {
        self.dispatch(FsOp::Write, path, |h| h.write(path, data, offset, fh))
    }

    pub fn truncate(&self, path: &str, size: u64, fh: Option<u64>) -> VfsResult<()> {
        self.dispatch(FsOp::Truncate, path, |h| h.truncate(path, size, fh))
    }

    pub fn chmod(&self, path: &str, mode: u32) -> VfsResult<()> {
        self.dispatch(FsOp::Chmod, path, |h| h.chmod(path, mode))
    }

    pub fn chown(&self, path: &str, uid: Option<u32>, gid: Option<u32>) -> VfsResult<()> {
        self.dispatch(FsOp::Chown, path, |h| h.chown(path, uid, gid))
    }

    pub fn utimens(
        &self,
        path: &str,
        atime: Option<SystemTime>,
        mtime: Option<SystemTime>,
    ) -> VfsResult<()> {
        self.dispatch(FsOp::Utimens, path, |h| h.utimens(path, atime, mtime))
    }

    pub fn unlink(&self, path: &str) -> VfsResult<()> {
        self.dispatch(FsOp::Unlink, path, |h| h.unlink(path))
    }

    pub fn rmdir(&self, path: &str) -> VfsResult<()> {
        self.dispatch(FsOp::RmDir, path, |h| h.rmdir(path))
    }

    /// Routed on the source path.
    pub fn rename(&self, path: &str, new_path: &str) -> VfsResult<()> {
        self.dispatch(FsOp::Rename, path, |h| h.rename(path, new_path))
    }

    /// Routed on the existing path.
    pub fn link(&self, path: &str, new_path: &str) -> VfsResult<()> {
        self.dispatch(FsOp::Link, path, |h| h.link(path, new_path))
    }

    // Operations that create a new name are routed on the parent directory.

    pub fn create(&self, path: &str, mode: u32, flags: i32) -> VfsResult<u64> {
        self.dispatch(FsOp::Create, parent_of(path), |h| h.create(path, mode, flags))
    }

    pub fn mkdir(&self, path: &str, mode: u32) -> VfsResult<()> {
        self.dispatch(FsOp::MkDir, parent_of(path), |h| h.mkdir(path, mode))
    }

    pub fn mknod(&self, path: &str, mode: u32, rdev: u32) -> VfsResult<()> {
        self.dispatch(FsOp::MkNod, parent_of(path), |h| h.mknod(path, mode, rdev))
    }

    pub fn symlink(&self, path: &str, target: &str) -> VfsResult<()> {
        self.dispatch(FsOp::Symlink, parent_of(path), |h| h.symlink(path, target))
    }
}

/// Unrouted paths and writes against the read-only tree are routine and
/// logged at debug; anything else is a warning.
fn expected_failure(op: FsOp, err: &FsError) -> bool {
    match err {
        FsError::NoRouteFound { .. } => true,
        FsError::NotSupported { .. } => op.is_mutating(),
        _ => false,
    }
}

/// Parent directory of an absolute path; `/` is its own parent.
pub fn parent_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &trimmed[..idx],
    }
}

/// `parent/name` with exactly one separator.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttrDefaults;
    use crate::content::canonical_bytes;
    use crate::operations::PLACEHOLDER_FH;
    use crate::testing::{record, FakeSource};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<FakeSource>, VirtualFs) {
        let source = Arc::new(FakeSource::new());
        let router = Router::clickup(source.clone(), AttrDefaults { uid: 0, gid: 0 }).unwrap();
        (source, VirtualFs::new(router, Span::none()))
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/user"), "/");
        assert_eq!(parent_of("/teams/42"), "/teams");
        assert_eq!(parent_of("/teams/42/"), "/teams");
    }

    #[test]
    fn test_expected_failure_classification() {
        let unsupported = FsError::NotSupported {
            op: "mkdir".to_string(),
        };
        assert!(expected_failure(FsOp::MkDir, &unsupported));
        assert!(!expected_failure(FsOp::Read, &unsupported));

        let no_route = FsError::NoRouteFound {
            path: "/nope".to_string(),
        };
        assert!(expected_failure(FsOp::GetAttr, &no_route));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "user"), "/user");
        assert_eq!(join("/teams", "42"), "/teams/42");
    }

    #[test]
    fn test_unknown_path_is_enoent() {
        let (_, vfs) = setup();
        assert_eq!(vfs.getattr("/nope", None), Err(Errno(libc::ENOENT)));
        assert_eq!(vfs.readdir("/nope", None), Err(Errno(libc::ENOENT)));
    }

    #[test]
    fn test_remote_failure_is_eio() {
        let (source, vfs) = setup();
        source.fail();
        assert_eq!(vfs.getattr("/user", None), Err(Errno(libc::EIO)));
        assert_eq!(vfs.readdir("/teams", None), Err(Errno(libc::EIO)));
    }

    #[test]
    fn test_root_needs_no_remote() {
        let (source, vfs) = setup();
        source.fail();
        assert!(vfs.getattr("/", None).unwrap().is_dir());
        assert_eq!(
            vfs.readdir("/", None).unwrap(),
            vec![".", "..", "user", "teams"]
        );
    }

    #[test]
    fn test_write_user_is_erofs() {
        let (_, vfs) = setup();
        for payload in [&b""[..], b"{}", b"anything at all"] {
            assert_eq!(
                vfs.write("/user", payload, 0, PLACEHOLDER_FH),
                Err(Errno(libc::EROFS))
            );
        }
    }

    #[test]
    fn test_creation_routed_on_parent() {
        let (_, vfs) = setup();
        assert_eq!(vfs.mkdir("/new", 0o755), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.create("/teams/99", 0o644, 0), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.mknod("/x", 0o644, 0), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.symlink("/link", "/user"), Err(Errno(libc::EROFS)));
    }

    #[test]
    fn test_mutations_on_existing_nodes() {
        let (_, vfs) = setup();
        assert_eq!(vfs.unlink("/user"), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.rmdir("/teams"), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.rename("/user", "/me"), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.link("/user", "/me"), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.chmod("/user", 0o600), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.chown("/user", Some(0), None), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.utimens("/user", None, None), Err(Errno(libc::EROFS)));
        assert_eq!(vfs.truncate("/teams/42", 0, None), Err(Errno(libc::EROFS)));
    }

    #[test]
    fn test_access_succeeds_on_existing_nodes() {
        let (_, vfs) = setup();
        assert!(vfs.access("/", libc::R_OK).is_ok());
        assert!(vfs.access("/user", libc::W_OK).is_ok());
        assert_eq!(vfs.access("/missing", libc::R_OK), Err(Errno(libc::ENOENT)));
    }

    #[test]
    fn test_open_then_read_user() {
        let (_, vfs) = setup();
        let attr = vfs.getattr("/user", None).unwrap();
        let fh = vfs.open("/user", libc::O_RDONLY).unwrap();
        assert_eq!(fh, PLACEHOLDER_FH);
        let data = vfs.read("/user", attr.size as u32, 0, fh).unwrap();
        assert_eq!(
            data,
            canonical_bytes(&record(json!({"id": 7, "username": "sam"}))).unwrap()
        );
    }

    #[test]
    fn test_open_for_write_is_erofs() {
        let (_, vfs) = setup();
        assert_eq!(vfs.open("/user", libc::O_RDWR), Err(Errno(libc::EROFS)));
    }

    #[test]
    fn test_read_directory_is_eisdir() {
        let (_, vfs) = setup();
        assert_eq!(vfs.read("/teams", 10, 0, 0), Err(Errno(libc::EISDIR)));
    }

    #[test]
    fn test_readdir_file_is_enotdir() {
        let (_, vfs) = setup();
        assert_eq!(vfs.readdir("/user", None), Err(Errno(libc::ENOTDIR)));
    }

    #[test]
    fn test_readlink_is_einval() {
        let (_, vfs) = setup();
        assert_eq!(vfs.readlink("/user"), Err(Errno(libc::EINVAL)));
    }

    #[test]
    fn test_statfs_constant() {
        let (_, vfs) = setup();
        assert_eq!(vfs.statfs("/").unwrap(), FsStats::default());
        assert_eq!(vfs.statfs("/teams/42").unwrap(), FsStats::default());
    }

    #[test]
    fn test_kind_without_remote_call() {
        let (source, vfs) = setup();
        assert_eq!(vfs.kind("/"), Some(NodeKind::Directory));
        assert_eq!(vfs.kind("/teams"), Some(NodeKind::Directory));
        assert_eq!(vfs.kind("/user"), Some(NodeKind::File));
        assert_eq!(vfs.kind("/teams/7"), Some(NodeKind::File));
        assert_eq!(vfs.kind("/other"), None);
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_neutral_file_ops() {
        let (_, vfs) = setup();
        assert!(vfs.flush("/user", PLACEHOLDER_FH).is_ok());
        assert!(vfs.release("/user", PLACEHOLDER_FH).is_ok());
        assert!(vfs.fsync("/user", true, PLACEHOLDER_FH).is_ok());
    }

    #[test]
    fn test_outcome_summaries() {
        assert_eq!(().summary(), "ok");
        assert_eq!(vec![1u8, 2, 3].summary(), "bytes=3");
        assert_eq!(vec!["a".to_string()].summary(), "entries=1");
        assert_eq!(7u64.summary(), "fh=7");
    }
}
