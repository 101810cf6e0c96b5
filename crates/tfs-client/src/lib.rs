//! HTTP binding of the tree hooks for the DBE server.

pub mod dbe;
pub mod error;
pub mod wire;

pub use dbe::DbeBackend;
pub use error::{ClientError, ClientResult};
