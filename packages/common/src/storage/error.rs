use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object does not exist in the backend.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The requested path escapes the storage root or is otherwise unusable.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// A client-supplied content hash could not be parsed.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A failure reported by a remote backend, tagged with the backend name.
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    /// The backend could not be built from its configuration.
    #[error("storage configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub(crate) fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend,
            message: err.to_string(),
        }
    }
}
