//! Error types for load-bearer-core

use thiserror::Error;

/// Result type alias for load-bearer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the load-bearer HTTP server
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid route path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path registered twice
    #[error("Route already registered: {0}")]
    DuplicateRoute(String),

    /// IO error (bind, accept, runtime construction)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Called outside a tokio runtime
    #[error("No tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}
