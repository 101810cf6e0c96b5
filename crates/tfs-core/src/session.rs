//! An interactive session over one tree cache.
//!
//! The session owns the tree, the working directory and the configuration,
//! and exposes one method per shell command. The working directory is kept
//! as path segments rather than a node id, so invalidation never leaves it
//! dangling; it is re-resolved on use.

use std::path::PathBuf;

use serde::Serialize;
use tfs_hooks::HookRegistry;
use tfs_types::{Result, TfsError};

use crate::config::{CacheMode, TfsConfig};
use crate::mutation::AttrWrite;
use crate::node::NodeId;
use crate::path;
use crate::resolver::ResolveMode;
use crate::store::CacheFile;
use crate::tree::Tree;

/// Key filter that matches every attribute.
pub const ALL_ATTRIBUTES: &str = "*";

/// One line of a `tree` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Depth below the listed node; the listed node itself is 0.
    pub depth: usize,
    pub name: String,
    pub path: String,
    pub initialized: bool,
}

pub struct Session {
    tree: Tree,
    config: TfsConfig,
    cwd: Vec<String>,
    prev: Option<Vec<String>>,
}

impl Session {
    /// A fresh session with the configured mounts and an empty cache.
    pub fn new(config: TfsConfig, hooks: HookRegistry) -> Result<Self> {
        let tree = Tree::new(hooks, config.host.clone(), &config.mounts)?;
        Ok(Self {
            tree,
            config,
            cwd: Vec::new(),
            prev: None,
        })
    }

    /// Start a session. In persisted mode the cache file is loaded first; a
    /// missing file starts empty and a file saved for another host is ignored.
    pub async fn start(config: TfsConfig, hooks: HookRegistry) -> Result<Self> {
        if config.mode != CacheMode::Persisted {
            return Self::new(config, hooks);
        }
        let loaded = match CacheFile::load(&config.cache_file)? {
            Some(file) if file.meta.host == config.host => file,
            Some(file) => {
                tracing::warn!(
                    path = %config.cache_file.display(),
                    cached_host = %file.meta.host,
                    host = %config.host,
                    "cache file belongs to another host, starting empty"
                );
                return Self::new(config, hooks);
            }
            None => return Self::new(config, hooks),
        };
        let mut tree = Tree::new(hooks, config.host.clone(), &[] as &[&str])?;
        tree.restore(&loaded)?;
        let mounted = tree.mounts();
        for mount in &config.mounts {
            if !mounted.contains(mount) {
                tree.mount(mount)?;
            }
        }
        Ok(Self {
            tree,
            config,
            cwd: Vec::new(),
            prev: None,
        })
    }

    pub fn config(&self) -> &TfsConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    pub fn pwd(&self) -> String {
        path::format(&self.cwd)
    }

    pub fn prompt(&self) -> String {
        format!("cli@{}:{}$ ", self.config.host, self.pwd())
    }

    fn target(path: Option<&str>) -> &str {
        path.unwrap_or("")
    }

    /// Sorted child names of `path` (or the working directory).
    pub async fn ls(&mut self, path: Option<&str>) -> Result<Vec<String>> {
        let id = self.tree.resolve(&self.cwd, Self::target(path), ResolveMode::Lazy).await?;
        Ok(self.tree.arena()[id]
            .child_names()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// The cached subtree of `path`, depth first. Only the listed node is
    /// fetched; descendants are shown as cached.
    pub async fn tree_listing(&mut self, path: Option<&str>) -> Result<Vec<TreeEntry>> {
        let id = self.tree.resolve(&self.cwd, Self::target(path), ResolveMode::Lazy).await?;
        let arena = self.tree.arena();
        let entry = |depth: usize, id: NodeId| {
            let node = &arena[id];
            TreeEntry {
                depth,
                name: if node.parent().is_none() {
                    path::SEPARATOR.to_string()
                } else {
                    node.name().to_string()
                },
                path: self.tree.path_string(id),
                initialized: node.initialized(),
            }
        };
        let mut out = vec![entry(0, id)];
        out.extend(arena.descendants(id).into_iter().map(|(depth, child)| entry(depth, child)));
        Ok(out)
    }

    /// Change directory. No argument goes to the root, `-` to the previous
    /// directory. Going to the root keeps the previous directory as it was.
    pub async fn cd(&mut self, path: Option<&str>) -> Result<String> {
        let next = match path {
            None => {
                self.cwd.clear();
                return Ok(self.pwd());
            }
            Some("-") => self
                .prev
                .clone()
                .ok_or_else(|| TfsError::InvalidOperation("cd -: no previous directory".to_string()))?,
            Some(target) => {
                let id = self.tree.resolve(&self.cwd, target, ResolveMode::Lazy).await?;
                self.tree.arena().path_of(id)
            }
        };
        let old = std::mem::replace(&mut self.cwd, next);
        self.prev = Some(old);
        Ok(self.pwd())
    }

    pub async fn mkdir(&mut self, path: &str, parents: bool) -> Result<String> {
        self.tree.make_node(&self.cwd, path, parents).await
    }

    pub async fn rm(&mut self, path: &str, recursive: bool) -> Result<String> {
        let removed = self.tree.remove_node(&self.cwd, path, recursive).await?;
        self.leave_if_inside(&removed);
        Ok(removed)
    }

    pub async fn rename(&mut self, path: &str, new_name: &str, recursive: bool) -> Result<String> {
        let renamed = self.tree.rename_node(&self.cwd, path, new_name, recursive).await?;
        self.leave_if_inside(&renamed);
        Ok(renamed)
    }

    pub async fn get(&mut self, path: &str, key: &str) -> Result<String> {
        self.tree.get_attribute(&self.cwd, path, key).await
    }

    pub async fn set(&mut self, path: &str, key: &str, value: &str) -> Result<AttrWrite> {
        self.tree.set_attribute(&self.cwd, path, key, value).await
    }

    pub async fn unset(&mut self, path: &str, key: &str) -> Result<()> {
        self.tree.unset_attribute(&self.cwd, path, key).await
    }

    /// Attributes of `path` whose key contains `pattern`; `*` or no pattern
    /// lists all of them.
    pub async fn stat(&mut self, path: Option<&str>, pattern: Option<&str>) -> Result<Vec<(String, String)>> {
        let segments = path::normalize(&self.cwd, Self::target(path))?;
        if segments.is_empty() {
            return Err(TfsError::InvalidOperation("the root has no attributes".to_string()));
        }
        let id = self.tree.resolve_segments(&segments, ResolveMode::Lazy).await?;
        let pattern = pattern.filter(|p| *p != ALL_ATTRIBUTES);
        Ok(self.tree.arena()[id]
            .attributes()
            .iter()
            .filter(|(k, _)| pattern.map_or(true, |p| k.contains(p)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Absolute paths of cached descendants whose name contains `pattern`.
    pub async fn find(&mut self, pattern: &str, path: Option<&str>) -> Result<Vec<String>> {
        let id = self.tree.resolve(&self.cwd, Self::target(path), ResolveMode::Lazy).await?;
        let arena = self.tree.arena();
        Ok(arena
            .descendants(id)
            .into_iter()
            .filter(|(_, child)| arena[*child].name().contains(pattern))
            .map(|(_, child)| self.tree.path_string(child))
            .collect())
    }

    /// Invalidate `path` (or the working directory) so the next read
    /// re-fetches it.
    pub fn refresh(&mut self, path: Option<&str>) -> Result<String> {
        let segments = path::normalize(&self.cwd, Self::target(path))?;
        let id = self.tree.refresh(&segments);
        Ok(self.tree.path_string(id))
    }

    pub fn mount(&mut self, name: &str) -> Result<String> {
        let id = self.tree.mount(name)?;
        Ok(self.tree.path_string(id))
    }

    pub fn unmount(&mut self, name: &str) -> Result<()> {
        self.tree.unmount(name)?;
        self.leave_if_inside(&path::format(&[name]));
        Ok(())
    }

    /// Write the cache file. Only valid in persisted mode.
    pub fn save(&self) -> Result<PathBuf> {
        if self.config.mode != CacheMode::Persisted {
            return Err(TfsError::InvalidOperation(format!(
                "save: cache mode is {}",
                self.config.mode
            )));
        }
        CacheFile::capture(&self.tree).save(&self.config.cache_file)?;
        Ok(self.config.cache_file.clone())
    }

    /// Persist the cache on exit when the session runs in persisted mode.
    pub fn close(&self) -> Result<()> {
        if self.config.mode == CacheMode::Persisted {
            self.save()?;
        }
        Ok(())
    }

    fn leave_if_inside(&mut self, gone: &str) {
        let gone = path::segments(gone);
        let inside = |dir: &[String]| dir.len() >= gone.len() && dir.iter().zip(&gone).all(|(a, b)| a == b);
        if inside(&self.cwd) {
            tracing::debug!(cwd = %self.pwd(), "working directory removed, returning to root");
            self.cwd.clear();
        }
        if self.prev.as_deref().map_or(false, inside) {
            self.prev = None;
        }
    }
}
