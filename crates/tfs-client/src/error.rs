//! Client error types.

use tfs_hooks::HookError;

/// Errors raised while talking to the DBE server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure, including timeouts.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-200 status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered 200 with a non-zero result code.
    #[error("server rejected request with code {code}: {body}")]
    Code { code: i64, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The real path cannot be addressed on the server.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl From<ClientError> for HookError {
    fn from(err: ClientError) -> Self {
        HookError::new(err.to_string())
    }
}

/// Convenience result type.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
