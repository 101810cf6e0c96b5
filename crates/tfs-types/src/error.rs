//! The error taxonomy shared by the tree cache, the hooks and the shell.
//!
//! Every failure a command can report is one variant of [`TfsError`]. All of
//! them are recoverable: the session reports the error and keeps running.

use crate::hook_kind::HookKind;
use crate::status_code::{self, status_code_t, CliCode, HookCode, StatusCode, TreeCode};

/// Errors raised by tree operations, hook calls and command parsing.
#[derive(Debug, thiserror::Error)]
pub enum TfsError {
    /// A path, node name or cached object is absent.
    #[error("object \"{0}\" not exists")]
    ObjectNotExists(String),

    /// A node with this name already exists where one was to be created.
    #[error("object \"{0}\" already exists")]
    ObjectExists(String),

    /// Sibling name collision detected while inserting into a child map.
    #[error("duplicate node name \"{0}\"")]
    DuplicateName(String),

    /// The attribute key is already present and overwrite was not requested.
    #[error("node \"{node}\" already has attribute \"{key}\"")]
    DuplicateAttribute { node: String, key: String },

    /// The attribute key is absent.
    #[error("node \"{node}\" has no attribute \"{key}\"")]
    AttributeNotExists { node: String, key: String },

    /// A `..` segment tried to ascend above the root.
    #[error("cursor overflow: cannot ascend above root")]
    CursorOverflow,

    /// A structural change that is never allowed.
    #[error("operation \"{0}\" is invalid")]
    InvalidOperation(String),

    /// No backend binding exists for the requested slot.
    #[error("hook method \"{hook}\" not exists")]
    HookMethodNotExists { hook: HookKind },

    /// The backend call ran and reported failure.
    #[error("hook method \"{hook}\" failed: {detail}")]
    HookMethodExec { hook: HookKind, detail: String },

    /// Unrecognized command name.
    #[error("command \"{0}\" not exists")]
    NoSuchCommand(String),

    /// A recognized option combination that is not supported.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The persisted cache file could not be decoded.
    #[error("cache data corrupted: {0}")]
    CacheDataCorrupted(String),

    /// Malformed command arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// Local file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TfsError {
    /// Numeric status code of this error.
    pub fn code(&self) -> status_code_t {
        match self {
            TfsError::ObjectNotExists(_) => TreeCode::NOT_FOUND,
            TfsError::ObjectExists(_) => TreeCode::EXISTS,
            TfsError::DuplicateName(_) => TreeCode::DUPLICATE_NAME,
            TfsError::DuplicateAttribute { .. } => TreeCode::ATTR_EXISTS,
            TfsError::AttributeNotExists { .. } => TreeCode::ATTR_NOT_FOUND,
            TfsError::CursorOverflow => TreeCode::CURSOR_OVERFLOW,
            TfsError::InvalidOperation(_) => TreeCode::INVALID_OPERATION,
            TfsError::HookMethodNotExists { .. } => HookCode::NOT_BOUND,
            TfsError::HookMethodExec { .. } => HookCode::EXEC_FAILED,
            TfsError::NoSuchCommand(_) => CliCode::NO_SUCH_COMMAND,
            TfsError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            TfsError::CacheDataCorrupted(_) => StatusCode::DATA_CORRUPTION,
            TfsError::InvalidArgument(_) => StatusCode::INVALID_ARG,
            TfsError::Config(_) => StatusCode::INVALID_CONFIG,
            TfsError::Io(_) => StatusCode::IO_ERROR,
        }
    }

    /// Stable name of the error kind, e.g. `"ObjectNotExists"`.
    pub fn kind(&self) -> &'static str {
        match self {
            TfsError::ObjectNotExists(_) => "ObjectNotExists",
            TfsError::ObjectExists(_) => "ObjectExists",
            TfsError::DuplicateName(_) => "DuplicateNameError",
            TfsError::DuplicateAttribute { .. } => "DuplicateAttributeError",
            TfsError::AttributeNotExists { .. } => "AttributeNotExists",
            TfsError::CursorOverflow => "CursorOverflow",
            TfsError::InvalidOperation(_) => "InvalidOperationError",
            TfsError::HookMethodNotExists { .. } => "HookMethodNotExists",
            TfsError::HookMethodExec { .. } => "HookMethodExecError",
            TfsError::NoSuchCommand(_) => "NoSuchCommandError",
            TfsError::NotImplemented(_) => "NotImplemented",
            TfsError::CacheDataCorrupted(_) => "CacheDataCorrupted",
            TfsError::InvalidArgument(_) => "InvalidArgument",
            TfsError::Config(_) => "ConfigError",
            TfsError::Io(_) => "IoError",
        }
    }

    /// Human-readable description like `"Tree::NotFound(3000) object \"x\" not exists"`.
    pub fn describe(&self) -> String {
        let code = self.code();
        format!("{}({}) {}", status_code::name(code).unwrap_or("Unknown"), code, self)
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TfsError>;
