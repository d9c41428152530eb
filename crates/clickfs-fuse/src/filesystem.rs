//! Kernel bridge.
//!
//! Implements `fuser::Filesystem` for ClickFS by translating inode-addressed
//! kernel requests into path-addressed [`VirtualFs`] calls. The bridge owns
//! only the inode ↔ path table; every answer comes from the router.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::os::raw::c_int;
use std::path::Path;
use std::time::{Duration, SystemTime};

use fuser::{
    FileType as FuserFileType, Filesystem, KernelConfig, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};
use tracing::{debug, info};

use crate::attr::{file_attr_to_fuser, node_kind_to_fuser_type, AttrDefaults, NodeKind};
use crate::error::Errno;
use crate::path_table::{InodeId, PathTable};
use crate::vfs::{join, parent_of, VfsResult, VirtualFs};

#[derive(Debug, Clone)]
pub struct ClickFsConfig {
    pub owner: AttrDefaults,
    pub attr_timeout: Duration,
    pub entry_timeout: Duration,
    pub direct_io: bool,
}

impl Default for ClickFsConfig {
    fn default() -> Self {
        Self {
            owner: AttrDefaults::default(),
            attr_timeout: Duration::from_secs(1),
            entry_timeout: Duration::from_secs(1),
            direct_io: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirEntry {
    pub ino: InodeId,
    pub offset: i64,
    pub kind: FuserFileType,
    pub name: String,
}

/// Requested attribute changes from a `setattr` call.
#[derive(Debug, Default, Clone)]
pub struct SetAttrRequest {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
    pub atime: Option<SystemTime>,
    pub mtime: Option<SystemTime>,
    pub fh: Option<u64>,
}

pub struct ClickFs {
    config: ClickFsConfig,
    vfs: VirtualFs,
    paths: PathTable,
}

impl ClickFs {
    pub fn new(vfs: VirtualFs, config: ClickFsConfig) -> Self {
        Self {
            config,
            vfs,
            paths: PathTable::new(),
        }
    }

    pub fn config(&self) -> &ClickFsConfig {
        &self.config
    }

    pub fn vfs(&self) -> &VirtualFs {
        &self.vfs
    }

    fn path_of(&self, ino: InodeId) -> VfsResult<String> {
        self.paths
            .path(ino)
            .map(str::to_string)
            .ok_or(Errno::ENOENT)
    }

    fn child_path(&self, parent: InodeId, name: &OsStr) -> VfsResult<String> {
        let parent = self.path_of(parent)?;
        Ok(join(&parent, &name.to_string_lossy()))
    }

    /// Attributes for `path`, registering it as looked up by the kernel.
    pub fn entry_for(&mut self, path: &str) -> VfsResult<fuser::FileAttr> {
        let attr = self.vfs.getattr(path, None)?;
        let ino = self.paths.lookup(path);
        Ok(file_attr_to_fuser(&attr, ino))
    }

    pub fn attr_for(&self, ino: InodeId, fh: Option<u64>) -> VfsResult<fuser::FileAttr> {
        let path = self.path_of(ino)?;
        let attr = self.vfs.getattr(&path, fh)?;
        Ok(file_attr_to_fuser(&attr, ino))
    }

    /// Directory entries of `ino` starting after kernel offset `offset`.
    pub fn dir_entries(&mut self, ino: InodeId, fh: u64, offset: i64) -> VfsResult<Vec<DirEntry>> {
        let path = self.path_of(ino)?;
        let names = self.vfs.readdir(&path, Some(fh))?;

        let live: HashSet<String> = names
            .iter()
            .filter(|n| *n != "." && *n != "..")
            .map(|n| join(&path, n))
            .collect();
        self.paths.prune_children(&path, &live);

        let skip = offset.max(0) as usize;
        let mut entries = Vec::with_capacity(names.len().saturating_sub(skip));
        for (i, name) in names.into_iter().enumerate().skip(skip) {
            let (entry_ino, kind) = match name.as_str() {
                "." => (ino, FuserFileType::Directory),
                ".." => (self.paths.intern(parent_of(&path)), FuserFileType::Directory),
                _ => {
                    let child = join(&path, &name);
                    let kind = self.vfs.kind(&child).unwrap_or(NodeKind::File);
                    (self.paths.intern(&child), node_kind_to_fuser_type(kind))
                }
            };
            entries.push(DirEntry {
                ino: entry_ino,
                offset: i as i64 + 1,
                kind,
                name,
            });
        }
        Ok(entries)
    }

    /// Apply each requested change in turn, then report fresh attributes.
    pub fn apply_setattr(&self, ino: InodeId, req: &SetAttrRequest) -> VfsResult<fuser::FileAttr> {
        let path = self.path_of(ino)?;

        if let Some(mode) = req.mode {
            self.vfs.chmod(&path, mode)?;
        }
        if req.uid.is_some() || req.gid.is_some() {
            self.vfs.chown(&path, req.uid, req.gid)?;
        }
        if let Some(size) = req.size {
            self.vfs.truncate(&path, size, req.fh)?;
        }
        if req.atime.is_some() || req.mtime.is_some() {
            self.vfs.utimens(&path, req.atime, req.mtime)?;
        }

        self.attr_for(ino, req.fh)
    }

    fn open_flags(&self) -> u32 {
        if self.config.direct_io {
            fuser::consts::FOPEN_DIRECT_IO
        } else {
            0
        }
    }
}

fn resolve_time(time: Option<TimeOrNow>) -> Option<SystemTime> {
    time.map(|t| match t {
        TimeOrNow::SpecificTime(t) => t,
        TimeOrNow::Now => SystemTime::now(),
    })
}

impl Filesystem for ClickFs {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!("ClickFS filesystem init");
        Ok(())
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let result = self
            .child_path(parent, name)
            .and_then(|path| self.entry_for(&path));
        match result {
            Ok(attr) => reply.entry(&self.config.entry_timeout, &attr, 0),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, nlookup: u64) {
        debug!("forget ino={} nlookup={}", ino, nlookup);
        self.paths.forget(ino, nlookup);
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, fh: Option<u64>, reply: ReplyAttr) {
        match self.attr_for(ino, fh) {
            Ok(attr) => reply.attr(&self.config.attr_timeout, &attr),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let req = SetAttrRequest {
            mode,
            uid,
            gid,
            size,
            atime: resolve_time(atime),
            mtime: resolve_time(mtime),
            fh,
        };
        match self.apply_setattr(ino, &req) {
            Ok(attr) => reply.attr(&self.config.attr_timeout, &attr),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.readlink(&path));
        match result {
            Ok(target) => reply.data(target.as_bytes()),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        rdev: u32,
        reply: ReplyEntry,
    ) {
        let result = self.child_path(parent, name).and_then(|path| {
            self.vfs.mknod(&path, mode, rdev)?;
            self.entry_for(&path)
        });
        match result {
            Ok(attr) => reply.entry(&self.config.entry_timeout, &attr, 0),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let result = self.child_path(parent, name).and_then(|path| {
            self.vfs.mkdir(&path, mode)?;
            self.entry_for(&path)
        });
        match result {
            Ok(attr) => reply.entry(&self.config.entry_timeout, &attr, 0),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result = self
            .child_path(parent, name)
            .and_then(|path| self.vfs.unlink(&path));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result = self
            .child_path(parent, name)
            .and_then(|path| self.vfs.rmdir(&path));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        reply: ReplyEntry,
    ) {
        let result = self.child_path(parent, link_name).and_then(|path| {
            self.vfs.symlink(&path, &target.to_string_lossy())?;
            self.entry_for(&path)
        });
        match result {
            Ok(attr) => reply.entry(&self.config.entry_timeout, &attr, 0),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        let result = self.child_path(parent, name).and_then(|path| {
            let new_path = self.child_path(newparent, newname)?;
            self.vfs.rename(&path, &new_path)
        });
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        newparent: u64,
        newname: &OsStr,
        reply: ReplyEntry,
    ) {
        let result = self.path_of(ino).and_then(|path| {
            let new_path = self.child_path(newparent, newname)?;
            self.vfs.link(&path, &new_path)?;
            self.entry_for(&new_path)
        });
        match result {
            Ok(attr) => reply.entry(&self.config.entry_timeout, &attr, 0),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.open(&path, flags));
        match result {
            Ok(fh) => reply.opened(fh, self.open_flags()),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.read(&path, size, offset as u64, fh));
        match result {
            Ok(data) => reply.data(&data),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.write(&path, data, offset.max(0) as u64, fh));
        match result {
            Ok(written) => reply.written(written),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn flush(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        _lock_owner: u64,
        reply: ReplyEmpty,
    ) {
        let result = self.path_of(ino).and_then(|path| self.vfs.flush(&path, fh));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.release(&path, fh));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn fsync(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        datasync: bool,
        reply: ReplyEmpty,
    ) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.fsync(&path, datasync, fh));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(errno) => {
                reply.error(errno.code());
                return;
            }
        };
        match self.vfs.kind(&path) {
            Some(NodeKind::Directory) => reply.opened(0, 0),
            Some(NodeKind::File) => reply.error(libc::ENOTDIR),
            None => reply.error(libc::ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        match self.dir_entries(ino, fh, offset) {
            Ok(entries) => {
                for entry in entries {
                    if reply.add(entry.ino, entry.offset, entry.kind, &entry.name) {
                        break;
                    }
                }
                reply.ok();
            }
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyStatfs) {
        let result = self.path_of(ino).and_then(|path| self.vfs.statfs(&path));
        match result {
            Ok(stats) => reply.statfs(
                stats.blocks,
                stats.bfree,
                stats.bavail,
                stats.files,
                stats.ffree,
                stats.bsize,
                stats.namelen,
                stats.frsize,
            ),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, mask: i32, reply: ReplyEmpty) {
        let result = self
            .path_of(ino)
            .and_then(|path| self.vfs.access(&path, mask));
        match result {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno.code()),
        }
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        flags: i32,
        reply: ReplyCreate,
    ) {
        let result = self.child_path(parent, name).and_then(|path| {
            let fh = self.vfs.create(&path, mode, flags)?;
            let attr = self.entry_for(&path)?;
            Ok((attr, fh))
        });
        match result {
            Ok((attr, fh)) => reply.created(
                &self.config.entry_timeout,
                &attr,
                0,
                fh,
                self.open_flags(),
            ),
            Err(errno) => reply.error(errno.code()),
        }
    }
}
