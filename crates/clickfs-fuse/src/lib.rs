//! ClickFS: the ClickUp API as a read-only FUSE filesystem.
//!
//! Paths are matched by a [`router::Router`] to a [`handler::Handler`], which
//! recomputes metadata and content from a [`source::RemoteSource`] on every
//! call. [`vfs::VirtualFs`] is the errno boundary and
//! [`filesystem::ClickFs`] bridges it to the kernel.

pub mod attr;
pub mod content;
pub mod error;
pub mod filesystem;
pub mod handler;
pub mod mount;
pub mod operations;
pub mod path_table;
pub mod router;
pub mod session;
pub mod source;
pub mod vfs;

#[cfg(test)]
mod testing;

pub use error::{Errno, FsError, Result};
pub use source::{BlockingSource, Record, RemoteSource, SourceError};
