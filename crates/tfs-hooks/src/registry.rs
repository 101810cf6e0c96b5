//! The hook registry: named operation slots bound once from a backend.
//!
//! Unbound slots are a valid state. They only surface as
//! [`TfsError::HookMethodNotExists`] when that operation is invoked, and the
//! backend is never reached in that case.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tfs_types::{HookKind, Result, TfsError};

use crate::backend::{HookError, NodeSnapshot, TreeDbBackend, UnboundBackend};

/// Dispatch table from [`HookKind`] to a backend call.
#[derive(Clone)]
pub struct HookRegistry {
    backend: Arc<dyn TreeDbBackend>,
    bound: BTreeSet<HookKind>,
}

impl HookRegistry {
    /// Bind the registry to a backend. The set of bound slots is read once here.
    pub fn bind(backend: Arc<dyn TreeDbBackend>) -> Self {
        let bound: BTreeSet<HookKind> = backend.bindings().into_iter().collect();
        tracing::debug!(bound = ?bound, "hook registry bound");
        Self { backend, bound }
    }

    /// A registry with every slot unbound.
    pub fn unbound() -> Self {
        Self::bind(Arc::new(UnboundBackend))
    }

    pub fn is_bound(&self, kind: HookKind) -> bool {
        self.bound.contains(&kind)
    }

    /// Slots that are bound, in declaration order.
    pub fn bound(&self) -> impl Iterator<Item = HookKind> + '_ {
        self.bound.iter().copied()
    }

    fn check(&self, kind: HookKind) -> Result<()> {
        if self.is_bound(kind) {
            Ok(())
        } else {
            tracing::warn!(hook = %kind, "hook method not bound");
            Err(TfsError::HookMethodNotExists { hook: kind })
        }
    }

    fn exec_error(kind: HookKind, real_path: &str, err: HookError) -> TfsError {
        tracing::warn!(hook = %kind, path = %real_path, detail = %err.detail, "hook method failed");
        TfsError::HookMethodExec {
            hook: kind,
            detail: err.detail,
        }
    }

    pub async fn open(&self, host: &str, real_path: &str) -> Result<NodeSnapshot> {
        self.check(HookKind::Open)?;
        tracing::debug!(host, path = %real_path, "hook open");
        self.backend
            .open(host, real_path)
            .await
            .map_err(|e| Self::exec_error(HookKind::Open, real_path, e))
    }

    pub async fn add(&self, host: &str, real_path: &str) -> Result<()> {
        self.check(HookKind::Add)?;
        tracing::debug!(host, path = %real_path, "hook add");
        self.backend
            .add(host, real_path)
            .await
            .map_err(|e| Self::exec_error(HookKind::Add, real_path, e))
    }

    pub async fn remove(&self, host: &str, real_path: &str) -> Result<()> {
        self.check(HookKind::Remove)?;
        tracing::debug!(host, path = %real_path, "hook remove");
        self.backend
            .remove(host, real_path)
            .await
            .map_err(|e| Self::exec_error(HookKind::Remove, real_path, e))
    }

    pub async fn update(&self, host: &str, real_path: &str, new_name: &str) -> Result<()> {
        self.check(HookKind::Update)?;
        tracing::debug!(host, path = %real_path, new_name, "hook update");
        self.backend
            .update(host, real_path, new_name)
            .await
            .map_err(|e| Self::exec_error(HookKind::Update, real_path, e))
    }

    pub async fn attr_add(&self, host: &str, real_path: &str, key: &str, value: &str) -> Result<()> {
        self.check(HookKind::AttrAdd)?;
        tracing::debug!(host, path = %real_path, key, "hook attr_add");
        self.backend
            .attr_add(host, real_path, key, value)
            .await
            .map_err(|e| Self::exec_error(HookKind::AttrAdd, real_path, e))
    }

    pub async fn attr_remove(&self, host: &str, real_path: &str, key: &str) -> Result<()> {
        self.check(HookKind::AttrRemove)?;
        tracing::debug!(host, path = %real_path, key, "hook attr_remove");
        self.backend
            .attr_remove(host, real_path, key)
            .await
            .map_err(|e| Self::exec_error(HookKind::AttrRemove, real_path, e))
    }

    pub async fn attr_update(
        &self,
        host: &str,
        real_path: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.check(HookKind::AttrUpdate)?;
        tracing::debug!(host, path = %real_path, key, "hook attr_update");
        self.backend
            .attr_update(host, real_path, key, value)
            .await
            .map_err(|e| Self::exec_error(HookKind::AttrUpdate, real_path, e))
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("bound", &self.bound)
            .finish()
    }
}
