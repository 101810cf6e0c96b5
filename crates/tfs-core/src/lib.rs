//! The lazy tree cache.
//!
//! A [`Tree`] mirrors part of a remote tree database. Paths are resolved
//! against cached nodes and fetched through the hook registry only when the
//! cache cannot answer. Writes go to the backend first and then demote the
//! affected cached node back to lazy state.

pub mod config;
pub mod materializer;
pub mod mutation;
pub mod node;
pub mod path;
pub mod resolver;
pub mod session;
pub mod store;
pub mod tree;

pub use config::{CacheMode, TfsConfig};
pub use mutation::AttrWrite;
pub use node::{Node, NodeArena, NodeId, ROOT_NODE_ID};
pub use resolver::ResolveMode;
pub use session::{Session, TreeEntry, ALL_ATTRIBUTES};
pub use store::{CacheFile, CacheMeta, CachedNode};
pub use tree::Tree;
