//! The backend-binding trait consumed by the hook registry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfs_types::HookKind;

/// Attribute and child-name snapshot of one remote node, as returned by `open`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub attributes: BTreeMap<String, String>,
    pub child_names: Vec<String>,
}

impl NodeSnapshot {
    pub fn new<K, V, N>(
        attributes: impl IntoIterator<Item = (K, V)>,
        child_names: impl IntoIterator<Item = N>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        N: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            child_names: child_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Failure detail reported by a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct HookError {
    pub detail: String,
}

impl HookError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// The backend declared a slot it does not actually serve.
    pub fn unsupported(kind: HookKind) -> Self {
        Self::new(format!("backend does not implement {}", kind))
    }
}

pub type HookResult<T> = std::result::Result<T, HookError>;

/// A backend serving some or all of the named tree operations.
///
/// `bindings` declares which slots the backend serves; it is read once when a
/// [`HookRegistry`](crate::HookRegistry) is bound. Methods for undeclared
/// slots are never called. `real_path` is always an absolute, normalized,
/// `/`-separated path whose first segment is the mount (file) name.
#[async_trait]
pub trait TreeDbBackend: Send + Sync {
    /// Slots this backend serves.
    fn bindings(&self) -> Vec<HookKind>;

    async fn open(&self, _host: &str, _real_path: &str) -> HookResult<NodeSnapshot> {
        Err(HookError::unsupported(HookKind::Open))
    }

    async fn add(&self, _host: &str, _real_path: &str) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::Add))
    }

    async fn remove(&self, _host: &str, _real_path: &str) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::Remove))
    }

    async fn update(&self, _host: &str, _real_path: &str, _new_name: &str) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::Update))
    }

    async fn attr_add(
        &self,
        _host: &str,
        _real_path: &str,
        _key: &str,
        _value: &str,
    ) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::AttrAdd))
    }

    async fn attr_remove(&self, _host: &str, _real_path: &str, _key: &str) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::AttrRemove))
    }

    async fn attr_update(
        &self,
        _host: &str,
        _real_path: &str,
        _key: &str,
        _value: &str,
    ) -> HookResult<()> {
        Err(HookError::unsupported(HookKind::AttrUpdate))
    }
}

/// A backend with no bindings at all. Every hook call reports
/// `HookMethodNotExists`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundBackend;

#[async_trait]
impl TreeDbBackend for UnboundBackend {
    fn bindings(&self) -> Vec<HookKind> {
        Vec::new()
    }
}
