use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Timestamp reported for every node. Remote records carry no usable mtime.
pub const NODE_EPOCH_SECS: u64 = 1_557_351_945;

/// Nominal size reported for directories.
pub const DIR_SIZE: u64 = 4096;

pub const DIR_PERM: u16 = 0o755;
pub const FILE_PERM: u16 = 0o444;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// Ownership stamped onto synthesized attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttrDefaults {
    pub uid: u32,
    pub gid: u32,
}

impl AttrDefaults {
    /// Owner of the file or directory at `path`.
    pub fn of_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            uid: meta.uid(),
            gid: meta.gid(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttr {
    pub size: u64,
    pub blocks: u64,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
    pub kind: NodeKind,
    pub perm: u16,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub blksize: u32,
}

impl FileAttr {
    pub fn new_file(size: u64, owner: AttrDefaults) -> Self {
        let stamp = node_epoch();
        FileAttr {
            size,
            blocks: blocks_for_size(size),
            atime: stamp,
            mtime: stamp,
            ctime: stamp,
            kind: NodeKind::File,
            perm: FILE_PERM,
            nlink: 1,
            uid: owner.uid,
            gid: owner.gid,
            blksize: 4096,
        }
    }

    pub fn new_dir(owner: AttrDefaults) -> Self {
        let stamp = node_epoch();
        FileAttr {
            size: DIR_SIZE,
            blocks: blocks_for_size(DIR_SIZE),
            atime: stamp,
            mtime: stamp,
            ctime: stamp,
            kind: NodeKind::Directory,
            perm: DIR_PERM,
            nlink: 2,
            uid: owner.uid,
            gid: owner.gid,
            blksize: 4096,
        }
    }

    /// Full `st_mode`, type bits included.
    pub fn mode(&self) -> u32 {
        let type_bits = match self.kind {
            NodeKind::Directory => libc::S_IFDIR,
            NodeKind::File => libc::S_IFREG,
        };
        type_bits as u32 | self.perm as u32
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

fn node_epoch() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(NODE_EPOCH_SECS)
}

fn blocks_for_size(size: u64) -> u64 {
    size.div_ceil(512)
}

pub fn node_kind_to_fuser_type(kind: NodeKind) -> fuser::FileType {
    match kind {
        NodeKind::Directory => fuser::FileType::Directory,
        NodeKind::File => fuser::FileType::RegularFile,
    }
}

pub fn file_attr_to_fuser(attr: &FileAttr, ino: u64) -> fuser::FileAttr {
    fuser::FileAttr {
        ino,
        size: attr.size,
        blocks: attr.blocks,
        atime: attr.atime,
        mtime: attr.mtime,
        ctime: attr.ctime,
        crtime: SystemTime::UNIX_EPOCH,
        kind: node_kind_to_fuser_type(attr.kind),
        perm: attr.perm,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: attr.blksize,
        flags: 0,
    }
}
