//! Connection state for a stream client

use std::fmt;

/// Connection lifecycle state, exactly one live value per connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket open
    Disconnected,
    /// TCP connect in progress
    Connecting,
    /// Receiving (or waiting for) stream data
    Connected,
    /// Connect attempt failed; reconnect pending if enabled
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        write!(f, "{}", s)
    }
}
