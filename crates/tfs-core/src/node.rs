//! Tree vertices and the arena that owns them.
//!
//! Every cached node lives in a [`NodeArena`] and is addressed by a
//! [`NodeId`]. Ownership flows parent to child through the child map; the
//! `parent` field is a plain back reference. Detaching a child drops its whole
//! subtree from the arena.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};

use tfs_types::{Result, TfsError};

// ── Node id ─────────────────────────────────────────────────────────────────

/// Handle to a node stored in a [`NodeArena`]. Ids are never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The root node id. The root exists for the lifetime of the arena.
pub const ROOT_NODE_ID: NodeId = NodeId(0);

// ── Node ────────────────────────────────────────────────────────────────────

/// One cached vertex of the remote tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: HashMap<String, NodeId>,
    attributes: BTreeMap<String, String>,
    initialized: bool,
}

impl Node {
    fn bare(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: HashMap::new(),
            attributes: BTreeMap::new(),
            initialized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether attributes and the child-name list were fetched and are
    /// trustworthy until the next invalidation.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    /// Child names in sorted order.
    pub fn child_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.children.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, id)` pairs in name order.
    pub fn children(&self) -> Vec<(&str, NodeId)> {
        let mut children: Vec<(&str, NodeId)> = self
            .children
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
            .collect();
        children.sort_unstable_by(|a, b| a.0.cmp(b.0));
        children
    }
}

// ── Arena ───────────────────────────────────────────────────────────────────

/// Owner of every cached node.
///
/// Indexing with a stale [`NodeId`] panics; callers only hold ids for the
/// duration of one operation.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    /// An arena holding only the root.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_NODE_ID, Node::bare("", None));
        Self { nodes, next_id: 1 }
    }

    pub fn root(&self) -> NodeId {
        ROOT_NODE_ID
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of cached nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(&parent).and_then(|node| node.child(name))
    }

    /// Create a bare, uninitialized child. Fails if `name` is taken.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        if self[parent].children.contains_key(name) {
            return Err(TfsError::DuplicateName(name.to_string()));
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::bare(name, Some(parent)));
        self[parent].children.insert(name.to_string(), id);
        Ok(id)
    }

    /// Create a child that is known complete: an empty, initialized leaf.
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let id = self.add_child(parent, name)?;
        self[id].initialized = true;
        Ok(id)
    }

    /// Detach a child and drop its subtree. Returns the detached node, whose
    /// child map is emptied.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> Result<Node> {
        let id = self[parent]
            .children
            .remove(name)
            .ok_or_else(|| TfsError::ObjectNotExists(name.to_string()))?;
        self.drop_descendants(id);
        let mut node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| TfsError::ObjectNotExists(name.to_string()))?;
        node.children.clear();
        Ok(node)
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str, overwrite: bool) -> Result<()> {
        let node = &mut self[id];
        if !overwrite && node.attributes.contains_key(key) {
            return Err(TfsError::DuplicateAttribute {
                node: node.name.clone(),
                key: key.to_string(),
            });
        }
        node.attributes.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Remove an attribute, returning its old value.
    pub fn delete_attribute(&mut self, id: NodeId, key: &str) -> Result<String> {
        let node = &mut self[id];
        node.attributes
            .remove(key)
            .ok_or_else(|| TfsError::AttributeNotExists {
                node: node.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn set_initialized(&mut self, id: NodeId, initialized: bool) {
        self[id].initialized = initialized;
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self[id].is_leaf()
    }

    /// Demote a node back to lazy state: drop its children and attributes and
    /// clear the initialized flag.
    pub fn invalidate(&mut self, id: NodeId) {
        self.drop_descendants(id);
        let node = &mut self[id];
        node.children.clear();
        node.attributes.clear();
        node.initialized = false;
    }

    /// Splice a fetched snapshot into `id`.
    ///
    /// Attributes are replaced. Cached children named in `child_names` keep
    /// their subtrees, other cached children are dropped, and new names are
    /// added as bare placeholders. The node becomes initialized.
    pub fn replace_snapshot(
        &mut self,
        id: NodeId,
        attributes: BTreeMap<String, String>,
        child_names: &[String],
    ) {
        let stale: Vec<String> = self[id]
            .children
            .keys()
            .filter(|name| !child_names.contains(*name))
            .cloned()
            .collect();
        for name in stale {
            if let Some(child) = self[id].children.remove(&name) {
                self.drop_descendants(child);
                self.nodes.remove(&child);
            }
        }
        for name in child_names {
            if self[id].children.contains_key(name) {
                continue;
            }
            let child = NodeId(self.next_id);
            self.next_id += 1;
            self.nodes.insert(child, Node::bare(name, Some(id)));
            self[id].children.insert(name.clone(), child);
        }
        let node = &mut self[id];
        node.attributes = attributes;
        node.initialized = true;
    }

    /// Segments from the root down to `id`. Empty for the root.
    pub fn path_of(&self, id: NodeId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self[current];
            if node.parent.is_none() {
                break;
            }
            segments.push(node.name.clone());
            cursor = node.parent;
        }
        segments.reverse();
        segments
    }

    /// Walk `segments` from the root through cached nodes only. Returns the
    /// deepest node reached and how many segments matched.
    pub fn lookup(&self, segments: &[String]) -> (NodeId, usize) {
        let mut cursor = ROOT_NODE_ID;
        for (depth, segment) in segments.iter().enumerate() {
            match self.child(cursor, segment) {
                Some(child) => cursor = child,
                None => return (cursor, depth),
            }
        }
        (cursor, segments.len())
    }

    /// Cached descendants of `id` in depth-first, name-sorted order, paired
    /// with their depth below `id` (children are depth 1).
    pub fn descendants(&self, id: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, NodeId)> = self[id]
            .children()
            .into_iter()
            .rev()
            .map(|(_, child)| (1, child))
            .collect();
        while let Some((depth, current)) = stack.pop() {
            out.push((depth, current));
            stack.extend(
                self[current]
                    .children()
                    .into_iter()
                    .rev()
                    .map(|(_, child)| (depth + 1, child)),
            );
        }
        out
    }

    fn drop_descendants(&mut self, id: NodeId) {
        let mut stack: Vec<NodeId> = self[id].children.values().copied().collect();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.values().copied());
            }
        }
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("stale node id {}", id),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("stale node id {}", id),
        }
    }
}
