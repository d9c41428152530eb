//! Inode numbers for path-addressed nodes.
//!
//! The kernel speaks in inodes; handlers speak in paths. The table hands out
//! a stable inode per path and drops it once the kernel forgets every lookup.

use std::collections::{HashMap, HashSet};

use crate::vfs::parent_of;

pub type InodeId = u64;
pub const ROOT_INODE: InodeId = 1;

#[derive(Debug, Clone)]
struct PathEntry {
    path: String,
    lookup_count: u64,
}

#[derive(Debug)]
pub struct PathTable {
    by_ino: HashMap<InodeId, PathEntry>,
    by_path: HashMap<String, InodeId>,
    next_ino: InodeId,
}

impl PathTable {
    pub fn new() -> Self {
        let mut table = PathTable {
            by_ino: HashMap::new(),
            by_path: HashMap::new(),
            next_ino: ROOT_INODE + 1,
        };
        table.by_ino.insert(
            ROOT_INODE,
            PathEntry {
                path: "/".to_string(),
                lookup_count: 1,
            },
        );
        table.by_path.insert("/".to_string(), ROOT_INODE);
        table
    }

    /// Inode for `path`, allocating one if the path is new. Lookup counts
    /// are left alone.
    pub fn intern(&mut self, path: &str) -> InodeId {
        if let Some(&ino) = self.by_path.get(path) {
            return ino;
        }

        let ino = self.next_ino;
        self.next_ino += 1;
        self.by_ino.insert(
            ino,
            PathEntry {
                path: path.to_string(),
                lookup_count: 0,
            },
        );
        self.by_path.insert(path.to_string(), ino);
        ino
    }

    /// Inode for `path` with one more kernel reference, as for a lookup reply.
    pub fn lookup(&mut self, path: &str) -> InodeId {
        let ino = self.intern(path);
        self.add_lookup(ino);
        ino
    }

    pub fn path(&self, ino: InodeId) -> Option<&str> {
        self.by_ino.get(&ino).map(|e| e.path.as_str())
    }

    pub fn ino(&self, path: &str) -> Option<InodeId> {
        self.by_path.get(path).copied()
    }

    pub fn add_lookup(&mut self, ino: InodeId) {
        if let Some(entry) = self.by_ino.get_mut(&ino) {
            entry.lookup_count += 1;
        }
    }

    pub fn lookup_count(&self, ino: InodeId) -> u64 {
        self.by_ino.get(&ino).map(|e| e.lookup_count).unwrap_or(0)
    }

    /// Drop `n` kernel references. The root is never removed.
    pub fn forget(&mut self, ino: InodeId, n: u64) {
        if ino == ROOT_INODE {
            return;
        }
        let should_remove = if let Some(entry) = self.by_ino.get_mut(&ino) {
            entry.lookup_count = entry.lookup_count.saturating_sub(n);
            entry.lookup_count == 0
        } else {
            false
        };
        if should_remove {
            if let Some(entry) = self.by_ino.remove(&ino) {
                self.by_path.remove(&entry.path);
            }
        }
    }

    /// Drop children of `parent` the kernel holds no reference to and that
    /// are absent from `live`, the directory's current listing.
    pub fn prune_children(&mut self, parent: &str, live: &HashSet<String>) -> usize {
        let stale: Vec<InodeId> = self
            .by_ino
            .iter()
            .filter(|(&ino, entry)| {
                ino != ROOT_INODE
                    && entry.lookup_count == 0
                    && entry.path != parent
                    && parent_of(&entry.path) == parent
                    && !live.contains(&entry.path)
            })
            .map(|(&ino, _)| ino)
            .collect();

        for ino in &stale {
            if let Some(entry) = self.by_ino.remove(ino) {
                self.by_path.remove(&entry.path);
            }
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.by_ino.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ino.is_empty()
    }
}

impl Default for PathTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_pre_populated() {
        let table = PathTable::new();
        assert_eq!(table.path(ROOT_INODE), Some("/"));
        assert_eq!(table.ino("/"), Some(ROOT_INODE));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_intern_is_stable() {
        let mut table = PathTable::new();
        let a = table.intern("/user");
        let b = table.intern("/user");
        assert_eq!(a, b);
        assert!(a > ROOT_INODE);
        assert_eq!(table.path(a), Some("/user"));
    }

    #[test]
    fn test_distinct_paths_distinct_inodes() {
        let mut table = PathTable::new();
        let a = table.intern("/teams/1");
        let b = table.intern("/teams/2");
        assert_ne!(a, b);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_lookup_counts() {
        let mut table = PathTable::new();
        let ino = table.lookup("/user");
        table.lookup("/user");
        assert_eq!(table.lookup_count(ino), 2);
    }

    #[test]
    fn test_forget_decrements_and_removes() {
        let mut table = PathTable::new();
        let ino = table.lookup("/teams");
        table.add_lookup(ino);

        table.forget(ino, 1);
        assert_eq!(table.path(ino), Some("/teams"));

        table.forget(ino, 1);
        assert!(table.path(ino).is_none());
        assert!(table.ino("/teams").is_none());
    }

    #[test]
    fn test_forgotten_path_gets_new_inode() {
        let mut table = PathTable::new();
        let first = table.lookup("/user");
        table.forget(first, 1);
        let second = table.lookup("/user");
        assert_ne!(first, second);
    }

    #[test]
    fn test_root_never_forgotten() {
        let mut table = PathTable::new();
        table.forget(ROOT_INODE, 100);
        assert_eq!(table.path(ROOT_INODE), Some("/"));
    }

    fn live(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_prune_drops_unreferenced_stale_children() {
        let mut table = PathTable::new();
        let teams = table.lookup("/teams");
        table.intern("/teams/1");
        table.intern("/teams/2");

        let removed = table.prune_children("/teams", &live(&["/teams/2"]));
        assert_eq!(removed, 1);
        assert!(table.ino("/teams/1").is_none());
        assert!(table.ino("/teams/2").is_some());
        assert_eq!(table.path(teams), Some("/teams"));
    }

    #[test]
    fn test_prune_keeps_looked_up_children() {
        let mut table = PathTable::new();
        let held = table.lookup("/teams/1");
        table.prune_children("/teams", &live(&[]));
        assert_eq!(table.path(held), Some("/teams/1"));
    }

    #[test]
    fn test_prune_leaves_other_directories_alone() {
        let mut table = PathTable::new();
        table.intern("/user");
        table.intern("/teams/1");
        table.prune_children("/teams", &live(&[]));
        assert!(table.ino("/user").is_some());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_forget_unknown_is_noop() {
        let mut table = PathTable::new();
        table.forget(999, 1);
        assert_eq!(table.len(), 1);
    }
}
