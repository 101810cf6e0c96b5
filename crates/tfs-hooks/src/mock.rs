//! A configurable mock backend for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tfs_types::HookKind;

use crate::backend::{HookResult, NodeSnapshot, TreeDbBackend};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    pub kind: HookKind,
    pub host: String,
    pub real_path: String,
    /// Operation arguments after the path (new name, key, value).
    pub args: Vec<String>,
}

type Handler<Rsp> = Box<dyn Fn(&HookCall) -> HookResult<Rsp> + Send + Sync>;

/// A configurable mock for [`TreeDbBackend`].
///
/// Each slot can be bound with a closure. Slots without a closure are
/// reported as unbound by [`TreeDbBackend::bindings`]. Every call is recorded.
pub struct MockTreeDb {
    pub open_handler: Mutex<Option<Handler<NodeSnapshot>>>,
    pub add_handler: Mutex<Option<Handler<()>>>,
    pub remove_handler: Mutex<Option<Handler<()>>>,
    pub update_handler: Mutex<Option<Handler<()>>>,
    pub attr_add_handler: Mutex<Option<Handler<()>>>,
    pub attr_remove_handler: Mutex<Option<Handler<()>>>,
    pub attr_update_handler: Mutex<Option<Handler<()>>>,
    calls: Mutex<Vec<HookCall>>,
}

impl MockTreeDb {
    pub fn new() -> Self {
        Self {
            open_handler: Mutex::new(None),
            add_handler: Mutex::new(None),
            remove_handler: Mutex::new(None),
            update_handler: Mutex::new(None),
            attr_add_handler: Mutex::new(None),
            attr_remove_handler: Mutex::new(None),
            attr_update_handler: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Wrap in an `Arc` for convenient sharing.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn on_open(&self, f: impl Fn(&HookCall) -> HookResult<NodeSnapshot> + Send + Sync + 'static) {
        *self.open_handler.lock() = Some(Box::new(f));
    }

    pub fn on_add(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.add_handler.lock() = Some(Box::new(f));
    }

    pub fn on_remove(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.remove_handler.lock() = Some(Box::new(f));
    }

    pub fn on_update(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.update_handler.lock() = Some(Box::new(f));
    }

    pub fn on_attr_add(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.attr_add_handler.lock() = Some(Box::new(f));
    }

    pub fn on_attr_remove(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.attr_remove_handler.lock() = Some(Box::new(f));
    }

    pub fn on_attr_update(&self, f: impl Fn(&HookCall) -> HookResult<()> + Send + Sync + 'static) {
        *self.attr_update_handler.lock() = Some(Box::new(f));
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().clone()
    }

    /// Calls received for one slot.
    pub fn calls_of(&self, kind: HookKind) -> Vec<HookCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn dispatch<Rsp>(
        &self,
        slot: &Mutex<Option<Handler<Rsp>>>,
        kind: HookKind,
        host: &str,
        real_path: &str,
        args: &[&str],
    ) -> HookResult<Rsp>
    where
        Rsp: Default,
    {
        let call = HookCall {
            kind,
            host: host.to_string(),
            real_path: real_path.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        };
        self.calls.lock().push(call.clone());
        match slot.lock().as_ref() {
            Some(handler) => handler(&call),
            None => Ok(Rsp::default()),
        }
    }
}

impl Default for MockTreeDb {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeDbBackend for MockTreeDb {
    fn bindings(&self) -> Vec<HookKind> {
        let mut bound = Vec::new();
        if self.open_handler.lock().is_some() {
            bound.push(HookKind::Open);
        }
        if self.add_handler.lock().is_some() {
            bound.push(HookKind::Add);
        }
        if self.remove_handler.lock().is_some() {
            bound.push(HookKind::Remove);
        }
        if self.update_handler.lock().is_some() {
            bound.push(HookKind::Update);
        }
        if self.attr_add_handler.lock().is_some() {
            bound.push(HookKind::AttrAdd);
        }
        if self.attr_remove_handler.lock().is_some() {
            bound.push(HookKind::AttrRemove);
        }
        if self.attr_update_handler.lock().is_some() {
            bound.push(HookKind::AttrUpdate);
        }
        bound
    }

    async fn open(&self, host: &str, real_path: &str) -> HookResult<NodeSnapshot> {
        self.dispatch(&self.open_handler, HookKind::Open, host, real_path, &[])
    }

    async fn add(&self, host: &str, real_path: &str) -> HookResult<()> {
        self.dispatch(&self.add_handler, HookKind::Add, host, real_path, &[])
    }

    async fn remove(&self, host: &str, real_path: &str) -> HookResult<()> {
        self.dispatch(&self.remove_handler, HookKind::Remove, host, real_path, &[])
    }

    async fn update(&self, host: &str, real_path: &str, new_name: &str) -> HookResult<()> {
        self.dispatch(
            &self.update_handler,
            HookKind::Update,
            host,
            real_path,
            &[new_name],
        )
    }

    async fn attr_add(&self, host: &str, real_path: &str, key: &str, value: &str) -> HookResult<()> {
        self.dispatch(
            &self.attr_add_handler,
            HookKind::AttrAdd,
            host,
            real_path,
            &[key, value],
        )
    }

    async fn attr_remove(&self, host: &str, real_path: &str, key: &str) -> HookResult<()> {
        self.dispatch(
            &self.attr_remove_handler,
            HookKind::AttrRemove,
            host,
            real_path,
            &[key],
        )
    }

    async fn attr_update(
        &self,
        host: &str,
        real_path: &str,
        key: &str,
        value: &str,
    ) -> HookResult<()> {
        self.dispatch(
            &self.attr_update_handler,
            HookKind::AttrUpdate,
            host,
            real_path,
            &[key, value],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HookError;

    #[test]
    fn test_bindings_follow_handlers() {
        let mock = MockTreeDb::new();
        assert!(mock.bindings().is_empty());
        mock.on_open(|_| Ok(NodeSnapshot::default()));
        mock.on_attr_remove(|_| Ok(()));
        assert_eq!(mock.bindings(), vec![HookKind::Open, HookKind::AttrRemove]);
    }

    #[tokio::test]
    async fn test_calls_are_recorded_with_args() {
        let mock = MockTreeDb::new();
        mock.on_update(|call| {
            if call.args[0] == "taken" {
                Err(HookError::new("exists"))
            } else {
                Ok(())
            }
        });

        mock.update("h", "/master/a", "b").await.unwrap();
        assert!(mock.update("h", "/master/a", "taken").await.is_err());

        let calls = mock.calls_of(HookKind::Update);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].real_path, "/master/a");
        assert_eq!(calls[0].args, vec!["b".to_string()]);
    }
}
