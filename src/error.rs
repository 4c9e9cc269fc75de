//! Error types for NetraIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// NetraIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TCP connect did not complete within the configured timeout
    #[error("Connect timeout to {0}")]
    ConnectTimeout(String),

    /// Peer closed the connection (EOF, reset, or broken pipe)
    #[error("Peer disconnected")]
    Disconnected,

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error should trigger a reconnect rather than terminate
    /// the worker. Only config errors are permanent.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::InvalidConfig(_))
    }
}
