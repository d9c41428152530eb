/// Handle returned by `open` on remote-backed files. Carries no state.
pub const PLACEHOLDER_FH: u64 = 1337;

/// Every filesystem operation the bridge can invoke on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    GetAttr,
    ReadDir,
    Open,
    Read,
    Write,
    Create,
    MkDir,
    RmDir,
    Unlink,
    Rename,
    Symlink,
    Link,
    Chmod,
    Chown,
    Utimens,
    Truncate,
    MkNod,
    ReadLink,
    Access,
    StatFs,
    Flush,
    Release,
    Fsync,
}

impl FsOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsOp::GetAttr => "getattr",
            FsOp::ReadDir => "readdir",
            FsOp::Open => "open",
            FsOp::Read => "read",
            FsOp::Write => "write",
            FsOp::Create => "create",
            FsOp::MkDir => "mkdir",
            FsOp::RmDir => "rmdir",
            FsOp::Unlink => "unlink",
            FsOp::Rename => "rename",
            FsOp::Symlink => "symlink",
            FsOp::Link => "link",
            FsOp::Chmod => "chmod",
            FsOp::Chown => "chown",
            FsOp::Utimens => "utimens",
            FsOp::Truncate => "truncate",
            FsOp::MkNod => "mknod",
            FsOp::ReadLink => "readlink",
            FsOp::Access => "access",
            FsOp::StatFs => "statfs",
            FsOp::Flush => "flush",
            FsOp::Release => "release",
            FsOp::Fsync => "fsync",
        }
    }

    /// Operations that would change remote or local state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            FsOp::Write
                | FsOp::Create
                | FsOp::MkDir
                | FsOp::RmDir
                | FsOp::Unlink
                | FsOp::Rename
                | FsOp::Symlink
                | FsOp::Link
                | FsOp::Chmod
                | FsOp::Chown
                | FsOp::Utimens
                | FsOp::Truncate
                | FsOp::MkNod
        )
    }
}

impl std::fmt::Display for FsOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate filesystem statistics. Synthetic; unrelated to remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub bsize: u32,
    pub frsize: u32,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub namelen: u32,
}

impl Default for FsStats {
    fn default() -> Self {
        Self {
            bsize: 1_048_576,
            frsize: 4096,
            blocks: 1_220_613,
            bfree: 760_260,
            bavail: 750_614,
            files: 42_949_672,
            ffree: 42_928_496,
            namelen: 255,
        }
    }
}

/// True when `open` flags ask for anything beyond read access.
pub fn wants_write(flags: i32) -> bool {
    let access = flags & libc::O_ACCMODE;
    access == libc::O_WRONLY
        || access == libc::O_RDWR
        || flags & (libc::O_TRUNC | libc::O_APPEND | libc::O_CREAT) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FsOp; 23] = [
        FsOp::GetAttr,
        FsOp::ReadDir,
        FsOp::Open,
        FsOp::Read,
        FsOp::Write,
        FsOp::Create,
        FsOp::MkDir,
        FsOp::RmDir,
        FsOp::Unlink,
        FsOp::Rename,
        FsOp::Symlink,
        FsOp::Link,
        FsOp::Chmod,
        FsOp::Chown,
        FsOp::Utimens,
        FsOp::Truncate,
        FsOp::MkNod,
        FsOp::ReadLink,
        FsOp::Access,
        FsOp::StatFs,
        FsOp::Flush,
        FsOp::Release,
        FsOp::Fsync,
    ];

    #[test]
    fn test_op_names_unique() {
        let mut names: Vec<_> = ALL.iter().map(|op| op.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_mutating_set() {
        let mutating: Vec<_> = ALL.iter().filter(|op| op.is_mutating()).collect();
        assert_eq!(mutating.len(), 13);
        assert!(!FsOp::Read.is_mutating());
        assert!(!FsOp::Access.is_mutating());
        assert!(FsOp::Write.is_mutating());
        assert!(FsOp::Utimens.is_mutating());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(FsOp::GetAttr.to_string(), "getattr");
        assert_eq!(FsOp::MkNod.to_string(), "mknod");
    }

    #[test]
    fn test_statfs_constants() {
        let stats = FsStats::default();
        assert_eq!(stats.bsize, 1_048_576);
        assert_eq!(stats.namelen, 255);
        assert!(stats.bfree <= stats.blocks);
        assert!(stats.bavail <= stats.bfree);
        assert!(stats.ffree <= stats.files);
    }

    #[test]
    fn test_wants_write() {
        assert!(!wants_write(libc::O_RDONLY));
        assert!(wants_write(libc::O_WRONLY));
        assert!(wants_write(libc::O_RDWR));
        assert!(wants_write(libc::O_RDONLY | libc::O_TRUNC));
        assert!(!wants_write(libc::O_RDONLY | libc::O_NONBLOCK));
    }
}
