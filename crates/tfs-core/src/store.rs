//! Persisted node cache.
//!
//! The whole arena is written as one JSON document keyed by absolute path:
//!
//! ```json
//! { "meta":  { "host": "...", "version": "...", "saved_at": "..." },
//!   "cache": { "/master/t": { "attributes": {}, "children": [], "initialized": true } } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tfs_types::{Result, TfsError};

use crate::node::NodeId;
use crate::path;
use crate::tree::Tree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub host: String,
    pub version: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedNode {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFile {
    pub meta: CacheMeta,
    pub cache: BTreeMap<String, CachedNode>,
}

impl CacheFile {
    /// Capture every cached node of `tree`, root included.
    pub fn capture(tree: &Tree) -> Self {
        let arena = tree.arena();
        let root = arena.root();
        let mut cache = BTreeMap::new();
        let ids = std::iter::once(root).chain(arena.descendants(root).into_iter().map(|(_, id)| id));
        for id in ids {
            let node = &arena[id];
            cache.insert(
                tree.path_string(id),
                CachedNode {
                    attributes: node.attributes().clone(),
                    children: node.child_names().into_iter().map(String::from).collect(),
                    initialized: node.initialized(),
                },
            );
        }
        Self {
            meta: CacheMeta {
                host: tree.host().to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                saved_at: Utc::now().to_rfc3339(),
            },
            cache,
        }
    }

    pub fn save(&self, file: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TfsError::CacheDataCorrupted(e.to_string()))?;
        std::fs::write(file, json)?;
        tracing::info!(path = %file.display(), nodes = self.cache.len(), "cache saved");
        Ok(())
    }

    /// Read a cache file. `Ok(None)` when the file does not exist.
    pub fn load(file: &Path) -> Result<Option<Self>> {
        if !file.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(file)?;
        let parsed: Self = serde_json::from_str(&content)
            .map_err(|e| TfsError::CacheDataCorrupted(format!("{}: {}", file.display(), e)))?;
        for key in parsed.cache.keys() {
            if !path::is_absolute(key) {
                return Err(TfsError::CacheDataCorrupted(format!("relative cache key {:?}", key)));
            }
        }
        Ok(Some(parsed))
    }
}

impl Tree {
    /// Rebuild cached nodes from a loaded cache file. Levels without a record
    /// of their own come back as uninitialized placeholders; each record then
    /// restores its node's attributes, child placeholders and initialized flag.
    pub fn restore(&mut self, file: &CacheFile) -> Result<usize> {
        for (key, record) in &file.cache {
            let segments = path::normalize(&[], key)
                .map_err(|_| TfsError::CacheDataCorrupted(format!("bad cache key {:?}", key)))?;
            let id = self.placeholder_chain(&segments)?;
            for (k, v) in &record.attributes {
                self.arena.set_attribute(id, k, v, true)?;
            }
            for child in &record.children {
                if self.arena.child(id, child).is_none() {
                    path::validate_name(child)
                        .map_err(|_| TfsError::CacheDataCorrupted(format!("bad child name {:?}", child)))?;
                    self.arena.add_child(id, child)?;
                }
            }
            if id != self.arena.root() {
                self.arena.set_initialized(id, record.initialized);
            }
        }
        tracing::info!(nodes = file.cache.len(), "cache restored");
        Ok(file.cache.len())
    }

    fn placeholder_chain(&mut self, segments: &[String]) -> Result<NodeId> {
        let mut cursor = self.arena.root();
        for segment in segments {
            cursor = match self.arena.child(cursor, segment) {
                Some(child) => child,
                None => {
                    path::validate_name(segment)
                        .map_err(|_| TfsError::CacheDataCorrupted(format!("bad path segment {:?}", segment)))?;
                    self.arena.add_child(cursor, segment)?
                }
            };
        }
        Ok(cursor)
    }
}
