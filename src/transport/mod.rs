//! Transport layer for I/O abstraction
//!
//! The read loop never touches `TcpStream` directly; it goes through these
//! traits so the reconnect behavior is testable without a device on the
//! bench.

use crate::error::Result;

mod mock;
mod tcp;

pub use mock::{MockConnect, MockConnector, MockEvent, MockTransport};
pub use tcp::{TcpConnector, TcpTransport};

/// Byte stream transport for device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read.
    ///
    /// `Ok(0)` means the read timed out with no data (the caller should loop
    /// and re-check its stop flag). Peer EOF, reset, and broken pipe are
    /// reported as `Error::Disconnected`.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// Dialer that produces connected transports
///
/// `&mut self` lets scripted implementations step through a scenario; the
/// TCP implementation is stateless per call.
pub trait Connector: Send {
    /// Establish one connection, blocking up to the configured timeout
    fn connect(&mut self) -> Result<Box<dyn Transport>>;

    /// Human-readable endpoint for logging
    fn endpoint(&self) -> String;
}
