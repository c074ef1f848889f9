//! Content client error types.

use thiserror::Error;

/// Result type for content operations.
pub type ContentResult<T> = std::result::Result<T, ContentError>;

/// Errors that can occur when talking to the remote content service.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Request failed before a response arrived (connect error, timeout).
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a server-side failure (typically while it wakes up).
    #[error("content service unavailable (status {status})")]
    Unavailable { status: u16 },

    /// Service rejected a write.
    #[error("content api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client settings cannot address the API (bad base URL or API key).
    #[error("invalid content configuration: {0}")]
    Config(String),

    /// The source does not accept writes.
    #[error("content source is read-only")]
    ReadOnly,
}

impl ContentError {
    /// Whether the failure means the service is unreachable rather than
    /// that the request itself was wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Unavailable { .. })
    }
}
