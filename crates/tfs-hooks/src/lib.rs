//! Hook registry and backend bindings for the tree cache.
//!
//! A [`TreeDbBackend`] serves some or all of the seven named tree operations.
//! The [`HookRegistry`] binds one backend and dispatches each operation to it,
//! reporting unbound slots as errors. This crate also ships [`MockTreeDb`] for
//! scripted tests and [`MemTreeDb`], an in-memory tree database used for
//! offline sessions.

pub mod backend;
pub mod mem;
pub mod mock;
pub mod registry;

pub use backend::{HookError, HookResult, NodeSnapshot, TreeDbBackend, UnboundBackend};
pub use mem::MemTreeDb;
pub use mock::{HookCall, MockTreeDb};
pub use registry::HookRegistry;
