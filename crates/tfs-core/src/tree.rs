//! The lazy tree cache: a node arena bound to a hook registry and a host.
//!
//! Resolution lives in [`crate::resolver`], fetching in
//! [`crate::materializer`] and writes in [`crate::mutation`].

use tfs_hooks::HookRegistry;
use tfs_types::{Result, TfsError};

use crate::node::{NodeArena, NodeId};
use crate::path;

/// Partially populated local mirror of one remote tree database.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) arena: NodeArena,
    pub(crate) hooks: HookRegistry,
    pub(crate) host: String,
}

impl Tree {
    /// A tree with only the root, and `mounts` as bare top-level nodes.
    pub fn new<S: AsRef<str>>(hooks: HookRegistry, host: impl Into<String>, mounts: &[S]) -> Result<Self> {
        let mut tree = Self {
            arena: NodeArena::new(),
            hooks,
            host: host.into(),
        };
        for mount in mounts {
            tree.mount(mount.as_ref())?;
        }
        Ok(tree)
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn root(&self) -> NodeId {
        self.arena.root()
    }

    /// Add a top-level name. Local only; the backend is not consulted.
    pub fn mount(&mut self, name: &str) -> Result<NodeId> {
        path::validate_name(name)?;
        let root = self.arena.root();
        if self.arena.child(root, name).is_some() {
            return Err(TfsError::ObjectExists(path::format(&[name])));
        }
        let id = self.arena.add_child(root, name)?;
        tracing::debug!(mount = name, "mounted");
        Ok(id)
    }

    /// Drop a top-level name and its cached subtree. Local only.
    pub fn unmount(&mut self, name: &str) -> Result<()> {
        let root = self.arena.root();
        if self.arena.child(root, name).is_none() {
            return Err(TfsError::ObjectNotExists(path::format(&[name])));
        }
        self.arena.remove_child(root, name)?;
        tracing::debug!(mount = name, "unmounted");
        Ok(())
    }

    /// Top-level names in sorted order.
    pub fn mounts(&self) -> Vec<String> {
        self.arena[self.arena.root()]
            .child_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn is_mount(&self, id: NodeId) -> bool {
        self.arena[id].parent() == Some(self.arena.root())
    }

    /// Absolute path string of a cached node.
    pub fn path_string(&self, id: NodeId) -> String {
        path::format(&self.arena.path_of(id))
    }

    /// Invalidate the deepest cached node on `segments`. Invalidating the
    /// root invalidates every mount instead, since the root is never fetched.
    pub fn refresh(&mut self, segments: &[String]) -> NodeId {
        let (id, depth) = self.arena.lookup(segments);
        if id == self.arena.root() {
            let mounts: Vec<NodeId> = self.arena[id].children().into_iter().map(|(_, c)| c).collect();
            for mount in mounts {
                self.arena.invalidate(mount);
            }
        } else {
            self.arena.invalidate(id);
        }
        tracing::debug!(path = %path::format(&segments[..depth]), "refreshed");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::new(HookRegistry::unbound(), "localhost", &["master", "base"]).unwrap()
    }

    #[test]
    fn test_new_mounts_bare_top_level_nodes() {
        let t = tree();
        assert_eq!(t.mounts(), vec!["base", "master"]);
        let master = t.arena().child(t.root(), "master").unwrap();
        assert!(!t.arena()[master].initialized());
        assert!(t.is_mount(master));
        assert_eq!(t.path_string(master), "/master");
        assert_eq!(t.path_string(t.root()), "/");
    }

    #[test]
    fn test_mount_and_unmount() {
        let mut t = tree();
        t.mount("Co_1").unwrap();
        assert!(matches!(t.mount("Co_1"), Err(TfsError::ObjectExists(_))));
        assert!(matches!(t.mount("a/b"), Err(TfsError::InvalidArgument(_))));
        t.unmount("Co_1").unwrap();
        assert!(matches!(t.unmount("Co_1"), Err(TfsError::ObjectNotExists(_))));
        assert_eq!(t.mounts(), vec!["base", "master"]);
    }

    #[test]
    fn test_refresh_root_invalidates_mounts() {
        let mut t = tree();
        let master = t.arena().child(t.root(), "master").unwrap();
        t.arena.create_child(master, "a").unwrap();
        t.arena.set_initialized(master, true);

        let hit = t.refresh(&[]);
        assert_eq!(hit, t.root());
        assert_eq!(t.mounts(), vec!["base", "master"]);
        assert!(!t.arena()[master].initialized());
        assert!(t.arena().is_leaf(master));
    }

    #[test]
    fn test_refresh_stops_at_deepest_cached_node() {
        let mut t = tree();
        let master = t.arena().child(t.root(), "master").unwrap();
        let a = t.arena.create_child(master, "a").unwrap();
        t.arena.create_child(a, "b").unwrap();

        let hit = t.refresh(&["master".to_string(), "a".to_string(), "zzz".to_string()]);
        assert_eq!(hit, a);
        assert!(t.arena().is_leaf(a));
        assert!(!t.arena()[a].initialized());
    }
}
