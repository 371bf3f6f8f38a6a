//! Common error types for the Check Operadora client

use thiserror::Error;

/// Common result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the client crates
#[derive(Error, Debug)]
pub enum Error {
    /// WebSocket transport error (connect failure, abrupt close)
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP request error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected a request with an error response
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded artifact rejected before transmission
    #[error("Upload rejected: {0}")]
    UploadRejected(String),
}
