use std::os::raw::c_int;

use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No route for path: {path}")]
    NoRouteFound { path: String },

    #[error("Remote source unavailable: {0}")]
    RemoteUnavailable(#[from] SourceError),

    #[error("Operation not supported on a read-only node: {op}")]
    NotSupported { op: String },

    #[error("Not a directory: {path}")]
    NotDirectory { path: String },

    #[error("Is a directory: {path}")]
    IsDirectory { path: String },

    #[error("Invalid argument: {msg}")]
    InvalidArgument { msg: String },
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub fn to_errno(&self) -> i32 {
        use libc::*;
        match self {
            FsError::Io(e) => e.raw_os_error().unwrap_or(EIO),
            FsError::NoRouteFound { .. } => ENOENT,
            FsError::RemoteUnavailable(_) => EIO,
            FsError::NotSupported { .. } => EROFS,
            FsError::NotDirectory { .. } => ENOTDIR,
            FsError::IsDirectory { .. } => EISDIR,
            FsError::InvalidArgument { .. } => EINVAL,
        }
    }
}

/// OS error code handed to the kernel bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Errno(pub c_int);

impl Errno {
    pub const ENOENT: Errno = Errno(libc::ENOENT);
    pub const EIO: Errno = Errno(libc::EIO);

    pub fn code(self) -> c_int {
        self.0
    }
}

impl From<&FsError> for Errno {
    fn from(err: &FsError) -> Self {
        Errno(err.to_errno())
    }
}

impl From<FsError> for Errno {
    fn from(err: FsError) -> Self {
        Errno::from(&err)
    }
}

impl std::fmt::Display for Errno {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "errno {}", self.0)
    }
}
