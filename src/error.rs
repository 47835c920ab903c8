//! Error types for the Paddock service.

use thiserror::Error;

/// Main error type for Paddock operations.
///
/// The rate limiter core itself is infallible; errors only arise at the
/// edges, loading configuration and running the HTTP server.
#[derive(Error, Debug)]
pub enum PaddockError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Paddock operations.
pub type Result<T> = std::result::Result<T, PaddockError>;
