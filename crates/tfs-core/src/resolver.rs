//! Path resolution over the lazy tree.
//!
//! A path is anchored at the root (leading `/`) or at the caller's working
//! directory, folded, then walked segment by segment. What happens on a miss
//! depends on the [`ResolveMode`].

use tfs_types::{Result, TfsError};

use crate::node::NodeId;
use crate::path;
use crate::tree::Tree;

/// How to treat a segment with no cached node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Never reach the backend; a miss is `ObjectNotExists`.
    Local,
    /// Fetch through the materializer on a miss below the root or an
    /// uninitialized node, and fetch the final node if it is uninitialized.
    #[default]
    Lazy,
    /// Create missing nodes locally as initialized empty leaves.
    Insert,
}

impl Tree {
    /// Resolve `target` relative to the working directory `cwd`.
    pub async fn resolve(&mut self, cwd: &[String], target: &str, mode: ResolveMode) -> Result<NodeId> {
        let raw = path::anchored(cwd, target);
        self.resolve_segments(&raw, mode).await
    }

    /// Fold `raw` (which may contain `..`) and walk the result from the root.
    pub async fn resolve_segments<S: AsRef<str>>(&mut self, raw: &[S], mode: ResolveMode) -> Result<NodeId> {
        let segments = path::fold(raw)?;
        let root = self.arena.root();
        let mut cursor = root;
        for segment in &segments {
            if let Some(child) = self.arena.child(cursor, segment) {
                cursor = child;
                continue;
            }
            match mode {
                ResolveMode::Insert => {
                    cursor = self.arena.create_child(cursor, segment)?;
                }
                ResolveMode::Local => return Err(self.missing(cursor, segment)),
                ResolveMode::Lazy => {
                    if cursor != root && self.arena[cursor].initialized() {
                        return Err(self.missing(cursor, segment));
                    }
                    tracing::debug!(
                        from = %self.path_string(cursor),
                        target = %path::format(&segments),
                        "cache miss, delegating to materializer"
                    );
                    return self.materialize(&segments).await;
                }
            }
        }
        if mode == ResolveMode::Lazy && cursor != root && !self.arena[cursor].initialized() {
            return self.materialize(&segments).await;
        }
        Ok(cursor)
    }

    fn missing(&self, cursor: NodeId, segment: &str) -> TfsError {
        let mut segments = self.arena.path_of(cursor);
        segments.push(segment.to_string());
        TfsError::ObjectNotExists(path::format(&segments))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tfs_hooks::{HookError, HookRegistry, MockTreeDb, NodeSnapshot};
    use tfs_types::HookKind;

    use super::*;

    fn cwd(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn local_tree() -> Tree {
        let mut tree = Tree::new(HookRegistry::unbound(), "localhost", &["master", "base"]).unwrap();
        insert_path(&mut tree, "/master/tableA/row1");
        insert_path(&mut tree, "/base/x");
        tree
    }

    fn insert_path(tree: &mut Tree, p: &str) {
        let raw: Vec<String> = path::anchored(&[], p);
        let mut cursor = tree.root();
        for segment in raw {
            cursor = match tree.arena.child(cursor, &segment) {
                Some(c) => c,
                None => tree.arena.create_child(cursor, &segment).unwrap(),
            };
        }
    }

    fn lazy_tree(mock: &Arc<MockTreeDb>) -> Tree {
        Tree::new(HookRegistry::bind(mock.clone()), "host", &["master"]).unwrap()
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_cwd() {
        let mut tree = local_tree();
        let from_root = tree.resolve(&[], "/master/tableA", ResolveMode::Local).await.unwrap();
        for start in [cwd(&[]), cwd(&["base", "x"]), cwd(&["master", "tableA", "row1"])] {
            let id = tree.resolve(&start, "/master/tableA", ResolveMode::Local).await.unwrap();
            assert_eq!(id, from_root);
        }
    }

    #[tokio::test]
    async fn test_parent_segments() {
        let mut tree = local_tree();
        let here = cwd(&["master", "tableA", "row1"]);
        let table = tree.resolve(&here, "..", ResolveMode::Local).await.unwrap();
        assert_eq!(tree.path_string(table), "/master/tableA");
        let x = tree.resolve(&here, "../../../base/./x", ResolveMode::Local).await.unwrap();
        assert_eq!(tree.path_string(x), "/base/x");

        assert!(matches!(
            tree.resolve(&[], "..", ResolveMode::Local).await,
            Err(TfsError::CursorOverflow)
        ));
        assert!(matches!(
            tree.resolve(&here, "../../../..", ResolveMode::Local).await,
            Err(TfsError::CursorOverflow)
        ));
    }

    #[tokio::test]
    async fn test_empty_and_bare_separator() {
        let mut tree = local_tree();
        let here = cwd(&["master", "tableA"]);
        let cur = tree.resolve(&here, "", ResolveMode::Local).await.unwrap();
        assert_eq!(tree.path_string(cur), "/master/tableA");
        let root = tree.resolve(&here, "/", ResolveMode::Local).await.unwrap();
        assert_eq!(root, tree.root());
    }

    #[tokio::test]
    async fn test_local_miss_is_object_not_exists() {
        let mut tree = local_tree();
        match tree.resolve(&[], "/master/nope/deeper", ResolveMode::Local).await {
            Err(TfsError::ObjectNotExists(p)) => assert_eq!(p, "/master/nope"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insert_mode_creates_initialized_leaves() {
        let mut tree = local_tree();
        let before = tree.arena().len();
        let id = tree.resolve(&[], "/base/y/z", ResolveMode::Insert).await.unwrap();
        assert_eq!(tree.arena().len(), before + 2);
        assert!(tree.arena()[id].initialized());
        assert_eq!(tree.path_string(id), "/base/y/z");
    }

    #[tokio::test]
    async fn test_lazy_fetch_is_one_open_with_full_path() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|_| Ok(NodeSnapshot::new([("type", "row")], ["col1", "col2"])));
        let mut tree = lazy_tree(&mock);

        let row = tree.resolve(&[], "/master/tableA/row1", ResolveMode::Lazy).await.unwrap();

        let calls = mock.calls_of(HookKind::Open);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].host, "host");
        assert_eq!(calls[0].real_path, "/master/tableA/row1");

        let arena = tree.arena();
        assert!(arena[row].initialized());
        assert_eq!(arena[row].attribute("type"), Some("row"));
        assert_eq!(arena[row].child_names(), vec!["col1", "col2"]);
        for name in ["col1", "col2"] {
            let col = arena.child(row, name).unwrap();
            assert!(!arena[col].initialized());
        }

        let master = arena.child(tree.root(), "master").unwrap();
        let table = arena.child(master, "tableA").unwrap();
        for bare in [master, table] {
            assert!(!arena[bare].initialized());
            assert!(arena[bare].attributes().is_empty());
        }
    }

    #[tokio::test]
    async fn test_lazy_miss_under_initialized_node_is_authoritative() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|_| Ok(NodeSnapshot::new(Vec::<(String, String)>::new(), ["a"])));
        let mut tree = lazy_tree(&mock);

        tree.resolve(&[], "/master", ResolveMode::Lazy).await.unwrap();
        assert_eq!(mock.calls().len(), 1);

        assert!(matches!(
            tree.resolve(&[], "/master/b", ResolveMode::Lazy).await,
            Err(TfsError::ObjectNotExists(_))
        ));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_lazy_fetch_from_bare_root_builds_whole_chain() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|_| Ok(NodeSnapshot::new([("type", "row")], ["col1"])));
        let mut tree = Tree::new(HookRegistry::bind(mock.clone()), "host", &[] as &[&str]).unwrap();
        assert_eq!(tree.arena().len(), 1);

        let row = tree.resolve(&[], "/master/tableA/row1", ResolveMode::Lazy).await.unwrap();

        let calls = mock.calls_of(HookKind::Open);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].real_path, "/master/tableA/row1");

        let arena = tree.arena();
        let master = arena.child(tree.root(), "master").unwrap();
        let table = arena.child(master, "tableA").unwrap();
        assert_eq!(arena.child(table, "row1"), Some(row));
        assert!(!arena[master].initialized());
        assert!(!arena[table].initialized());
        assert!(arena[row].initialized());
        assert_eq!(arena[row].attribute("type"), Some("row"));
        assert_eq!(arena.len(), 5);
    }

    #[tokio::test]
    async fn test_equivalent_spellings_resolve_alike() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|call| {
            if call.real_path == "/zzz" {
                Err(HookError::new("no such node"))
            } else {
                Ok(NodeSnapshot::default())
            }
        });

        let mut direct = lazy_tree(&mock);
        let direct_err = direct.resolve(&[], "/zzz", ResolveMode::Lazy).await.unwrap_err();
        let mut roundabout = lazy_tree(&mock);
        let roundabout_err = roundabout
            .resolve(&[], "/master/a/../../zzz", ResolveMode::Lazy)
            .await
            .unwrap_err();

        assert_eq!(direct_err.kind(), roundabout_err.kind());
        assert_eq!(direct_err.to_string(), roundabout_err.to_string());
        let opens: Vec<String> = mock.calls_of(HookKind::Open).into_iter().map(|c| c.real_path).collect();
        assert_eq!(opens, vec!["/zzz", "/zzz"]);
        for tree in [&direct, &roundabout] {
            assert_eq!(tree.arena()[tree.root()].child_names(), vec!["master"]);
        }

        assert!(matches!(
            direct.resolve(&[], "/master/a/../../..", ResolveMode::Lazy).await,
            Err(TfsError::CursorOverflow)
        ));
    }

    #[tokio::test]
    async fn test_lazy_resolution_folds_parent_after_miss() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|_| Ok(NodeSnapshot::default()));
        let mut tree = lazy_tree(&mock);

        let id = tree.resolve(&[], "/master/a/../b", ResolveMode::Lazy).await.unwrap();
        assert_eq!(tree.path_string(id), "/master/b");
        assert_eq!(mock.calls()[0].real_path, "/master/b");
    }

    #[tokio::test]
    async fn test_lazy_cached_initialized_path_makes_no_calls() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|_| Ok(NodeSnapshot::new([("k", "v")], ["c"])));
        let mut tree = lazy_tree(&mock);

        tree.resolve(&[], "/master/t", ResolveMode::Lazy).await.unwrap();
        tree.resolve(&[], "/master/t", ResolveMode::Lazy).await.unwrap();
        tree.resolve(&cwd(&["master", "t"]), ".", ResolveMode::Lazy).await.unwrap();
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_lazy_root_is_never_fetched() {
        let mock = Arc::new(MockTreeDb::new());
        let mut tree = lazy_tree(&mock);
        let id = tree.resolve(&cwd(&["master"]), "/", ResolveMode::Lazy).await.unwrap();
        assert_eq!(id, tree.root());
        assert!(mock.calls().is_empty());
    }
}
