//! In-memory tree database backed by a `BTreeMap`.
//!
//! Nodes are keyed by absolute path (`/file/a/b`); a node exists iff its key
//! is present. Children are found with a range scan over the key prefix. All
//! data lives behind a `parking_lot::RwLock`. Serves every hook slot.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tfs_types::HookKind;

use crate::backend::{HookError, HookResult, NodeSnapshot, TreeDbBackend};

type Attributes = BTreeMap<String, String>;

/// In-memory tree database.
#[derive(Default)]
pub struct MemTreeDb {
    nodes: RwLock<BTreeMap<String, Attributes>>,
    opens: AtomicUsize,
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Keys strictly below `path`, in order.
fn descendants<'a>(
    nodes: &'a BTreeMap<String, Attributes>,
    path: &str,
) -> impl Iterator<Item = &'a String> + 'a {
    let prefix = format!("{}/", path);
    nodes
        .range::<String, _>((Bound::Excluded(prefix.clone()), Bound::Unbounded))
        .map(|(k, _)| k)
        .take_while(move |k| k.starts_with(&prefix))
}

impl MemTreeDb {
    /// Create a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node with attributes, creating missing ancestors. Existing
    /// attributes of the node are merged.
    pub fn insert<K, V>(&self, path: &str, attributes: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let path = normalize(path);
        let mut nodes = self.nodes.write();
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);
            nodes.entry(prefix.clone()).or_default();
        }
        if let Some(attrs) = nodes.get_mut(&path) {
            attrs.extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.read().contains_key(&normalize(path))
    }

    pub fn attribute(&self, path: &str, key: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&normalize(path))
            .and_then(|attrs| attrs.get(key).cloned())
    }

    /// Number of nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Number of `open` calls served so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn not_found(path: &str) -> HookError {
        HookError::new(format!("path {} not found", path))
    }
}

fn normalize(path: &str) -> String {
    let mut out = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    out
}

#[async_trait]
impl TreeDbBackend for MemTreeDb {
    fn bindings(&self) -> Vec<HookKind> {
        HookKind::ALL.to_vec()
    }

    async fn open(&self, _host: &str, real_path: &str) -> HookResult<NodeSnapshot> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let path = normalize(real_path);
        let nodes = self.nodes.read();
        let attributes = nodes.get(&path).ok_or_else(|| Self::not_found(&path))?.clone();
        let depth = path.matches('/').count() + 1;
        let child_names = descendants(&nodes, &path)
            .filter(|k| k.matches('/').count() == depth)
            .map(|k| name_of(k).to_string())
            .collect();
        Ok(NodeSnapshot {
            attributes,
            child_names,
        })
    }

    async fn add(&self, _host: &str, real_path: &str) -> HookResult<()> {
        let path = normalize(real_path);
        let mut nodes = self.nodes.write();
        let parent = parent_of(&path);
        if !parent.is_empty() && !nodes.contains_key(parent) {
            return Err(Self::not_found(parent));
        }
        if nodes.contains_key(&path) {
            return Err(HookError::new(format!("path {} already exists", path)));
        }
        nodes.insert(path, Attributes::new());
        Ok(())
    }

    async fn remove(&self, _host: &str, real_path: &str) -> HookResult<()> {
        let path = normalize(real_path);
        let mut nodes = self.nodes.write();
        if nodes.remove(&path).is_none() {
            return Err(Self::not_found(&path));
        }
        let doomed: Vec<String> = descendants(&nodes, &path).cloned().collect();
        for key in doomed {
            nodes.remove(&key);
        }
        Ok(())
    }

    async fn update(&self, _host: &str, real_path: &str, new_name: &str) -> HookResult<()> {
        let path = normalize(real_path);
        if new_name.is_empty() || new_name.contains('/') {
            return Err(HookError::new(format!("invalid name {:?}", new_name)));
        }
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&path) {
            return Err(Self::not_found(&path));
        }
        let target = format!("{}/{}", parent_of(&path), new_name);
        if nodes.contains_key(&target) {
            return Err(HookError::new(format!("path {} already exists", target)));
        }
        let mut moved: Vec<String> = vec![path.clone()];
        moved.extend(descendants(&nodes, &path).cloned());
        for key in moved {
            if let Some(attrs) = nodes.remove(&key) {
                let renamed = format!("{}{}", target, &key[path.len()..]);
                nodes.insert(renamed, attrs);
            }
        }
        Ok(())
    }

    async fn attr_add(&self, _host: &str, real_path: &str, key: &str, value: &str) -> HookResult<()> {
        let path = normalize(real_path);
        let mut nodes = self.nodes.write();
        let attrs = nodes.get_mut(&path).ok_or_else(|| Self::not_found(&path))?;
        attrs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn attr_remove(&self, _host: &str, real_path: &str, key: &str) -> HookResult<()> {
        let path = normalize(real_path);
        let mut nodes = self.nodes.write();
        let attrs = nodes.get_mut(&path).ok_or_else(|| Self::not_found(&path))?;
        attrs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| HookError::new(format!("attribute {} not found on {}", key, path)))
    }

    async fn attr_update(
        &self,
        host: &str,
        real_path: &str,
        key: &str,
        value: &str,
    ) -> HookResult<()> {
        self.attr_add(host, real_path, key, value).await
    }
}
