//! The mutation pipeline.
//!
//! Every write resolves its parent lazily, checks local preconditions, calls
//! the matching hook and, only on success, invalidates the affected node so
//! the next read re-fetches it. The cache is never patched in place.

use tfs_types::{Result, TfsError};

use crate::node::NodeId;
use crate::path;
use crate::resolver::ResolveMode;
use crate::tree::Tree;

/// Which hook an attribute write was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrWrite {
    Added,
    Updated,
}

impl Tree {
    /// Create the node at `target`. With `parents`, create each missing level
    /// in turn and accept an existing target.
    pub async fn make_node(&mut self, cwd: &[String], target: &str, parents: bool) -> Result<String> {
        let segments = path::normalize(cwd, target)?;
        match segments.len() {
            0 => return Err(TfsError::InvalidOperation("mkdir /".to_string())),
            1 => {
                return Err(TfsError::InvalidOperation(format!(
                    "mkdir {}: top-level names are managed by mount",
                    path::format(&segments)
                )))
            }
            _ => {}
        }
        if !parents {
            self.add_one(&segments).await?;
            return Ok(path::format(&segments));
        }
        for depth in 2..=segments.len() {
            let level = &segments[..depth];
            let parent = self.resolve_segments(&level[..depth - 1], ResolveMode::Lazy).await?;
            if self.arena.child(parent, &level[depth - 1]).is_some() {
                continue;
            }
            self.add_one(level).await?;
        }
        Ok(path::format(&segments))
    }

    async fn add_one(&mut self, segments: &[String]) -> Result<()> {
        let (parent_segments, name) = split_last(segments)?;
        let parent = self.resolve_segments(parent_segments, ResolveMode::Lazy).await?;
        if self.arena.child(parent, name).is_some() {
            return Err(TfsError::ObjectExists(path::format(segments)));
        }
        let real_path = path::format(segments);
        self.hooks.add(&self.host, &real_path).await?;
        self.arena.invalidate(parent);
        tracing::info!(path = %real_path, "node created");
        Ok(())
    }

    /// Remove the node at `target`. Non-leaf nodes need `recursive`.
    pub async fn remove_node(&mut self, cwd: &[String], target: &str, recursive: bool) -> Result<String> {
        let segments = path::normalize(cwd, target)?;
        check_structural("rm", &segments)?;
        let (parent_segments, _) = split_last(&segments)?;
        let parent = self.resolve_segments(parent_segments, ResolveMode::Lazy).await?;
        let id = self.resolve_segments(&segments, ResolveMode::Lazy).await?;
        if !recursive && !self.arena.is_leaf(id) {
            return Err(TfsError::InvalidOperation(format!(
                "rm {}: node has children, use -r",
                path::format(&segments)
            )));
        }
        let real_path = path::format(&segments);
        self.hooks.remove(&self.host, &real_path).await?;
        self.arena.invalidate(parent);
        tracing::info!(path = %real_path, recursive, "node removed");
        Ok(real_path)
    }

    /// Rename the node at `target` within its parent.
    pub async fn rename_node(
        &mut self,
        cwd: &[String],
        target: &str,
        new_name: &str,
        recursive: bool,
    ) -> Result<String> {
        if recursive {
            return Err(TfsError::NotImplemented("recursive rename".to_string()));
        }
        if new_name.contains(path::SEPARATOR) {
            return Err(TfsError::NotImplemented(format!(
                "rename to {}: moving to another parent",
                new_name
            )));
        }
        path::validate_name(new_name)?;
        let segments = path::normalize(cwd, target)?;
        check_structural("mv", &segments)?;
        let (parent_segments, name) = split_last(&segments)?;
        let parent = self.resolve_segments(parent_segments, ResolveMode::Lazy).await?;
        if self.arena.child(parent, name).is_none() {
            return Err(TfsError::ObjectNotExists(path::format(&segments)));
        }
        if self.arena.child(parent, new_name).is_some() {
            let mut dest = self.arena.path_of(parent);
            dest.push(new_name.to_string());
            return Err(TfsError::ObjectExists(path::format(&dest)));
        }
        let real_path = path::format(&segments);
        self.hooks.update(&self.host, &real_path, new_name).await?;
        self.arena.invalidate(parent);
        tracing::info!(path = %real_path, new_name, "node renamed");
        Ok(real_path)
    }

    /// Set an attribute. An existing key goes through `attr_update`, a new
    /// one through `attr_add`.
    pub async fn set_attribute(&mut self, cwd: &[String], target: &str, key: &str, value: &str) -> Result<AttrWrite> {
        let (id, real_path) = self.attribute_target(cwd, target).await?;
        let write = if self.arena[id].attribute(key).is_some() {
            self.hooks.attr_update(&self.host, &real_path, key, value).await?;
            AttrWrite::Updated
        } else {
            self.hooks.attr_add(&self.host, &real_path, key, value).await?;
            AttrWrite::Added
        };
        self.arena.invalidate(id);
        tracing::info!(path = %real_path, key, ?write, "attribute set");
        Ok(write)
    }

    /// Delete an attribute that is present on the node.
    pub async fn unset_attribute(&mut self, cwd: &[String], target: &str, key: &str) -> Result<()> {
        let (id, real_path) = self.attribute_target(cwd, target).await?;
        if self.arena[id].attribute(key).is_none() {
            return Err(TfsError::AttributeNotExists {
                node: real_path,
                key: key.to_string(),
            });
        }
        self.hooks.attr_remove(&self.host, &real_path, key).await?;
        self.arena.invalidate(id);
        tracing::info!(path = %real_path, key, "attribute removed");
        Ok(())
    }

    /// Read one attribute, fetching the node if needed.
    pub async fn get_attribute(&mut self, cwd: &[String], target: &str, key: &str) -> Result<String> {
        let (id, real_path) = self.attribute_target(cwd, target).await?;
        self.arena[id]
            .attribute(key)
            .map(String::from)
            .ok_or_else(|| TfsError::AttributeNotExists {
                node: real_path,
                key: key.to_string(),
            })
    }

    async fn attribute_target(&mut self, cwd: &[String], target: &str) -> Result<(NodeId, String)> {
        let segments = path::normalize(cwd, target)?;
        if segments.is_empty() {
            return Err(TfsError::InvalidOperation("the root has no attributes".to_string()));
        }
        let id = self.resolve_segments(&segments, ResolveMode::Lazy).await?;
        Ok((id, path::format(&segments)))
    }
}

/// The root and the mounts are never removed or renamed.
fn check_structural(verb: &str, segments: &[String]) -> Result<()> {
    match segments.len() {
        0 => Err(TfsError::InvalidOperation(format!("{} /", verb))),
        1 => Err(TfsError::InvalidOperation(format!(
            "{} {}: mounts are managed by unmount",
            verb,
            path::format(segments)
        ))),
        _ => Ok(()),
    }
}

fn split_last(segments: &[String]) -> Result<(&[String], &str)> {
    match segments.split_last() {
        Some((name, parent)) => Ok((parent, name.as_str())),
        None => Err(TfsError::InvalidOperation("empty path".to_string())),
    }
}
