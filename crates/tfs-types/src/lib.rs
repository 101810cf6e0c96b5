#[allow(non_snake_case)]
pub mod status_code;

pub mod error;
pub mod hook_kind;

// Re-export commonly used items at the crate root.
pub use error::{Result, TfsError};
pub use hook_kind::HookKind;
pub use status_code::{status_code_t, CliCode, HookCode, StatusCode, StatusCodeType, TreeCode};
