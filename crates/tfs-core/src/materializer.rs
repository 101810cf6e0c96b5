//! Lazy materialization: one `open` round trip per resolution.
//!
//! The backend describes only the target node. Missing ancestors are rebuilt
//! locally as bare placeholders. Nothing in the arena changes unless the
//! `open` call succeeds.

use tfs_types::Result;

use crate::node::NodeId;
use crate::path;
use crate::tree::Tree;

impl Tree {
    /// Fetch the node at `target` (normalized, root-anchored segments) and
    /// splice it into the cache. Returns the target's id.
    pub async fn materialize(&mut self, target: &[String]) -> Result<NodeId> {
        let root = self.arena.root();
        if target.is_empty() {
            return Ok(root);
        }
        let real_path = path::format(target);
        let snapshot = self.hooks.open(&self.host, &real_path).await?;

        let mut cursor = root;
        let mut created = 0usize;
        for segment in target {
            cursor = match self.arena.child(cursor, segment) {
                Some(child) => child,
                None => {
                    created += 1;
                    self.arena.add_child(cursor, segment)?
                }
            };
        }
        let mut child_names = snapshot.child_names;
        child_names.sort();
        child_names.dedup();
        self.arena.replace_snapshot(cursor, snapshot.attributes, &child_names);
        tracing::debug!(
            path = %real_path,
            created,
            children = child_names.len(),
            "materialized"
        );
        Ok(cursor)
    }
}
