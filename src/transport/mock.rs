//! Mock transport for testing
//!
//! Plays back a scripted sequence of socket events so connection handling
//! and resynchronization can be exercised without hardware.

use super::{Connector, Transport};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One scripted socket event
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Deliver these bytes on the next read
    Data(Vec<u8>),
    /// One read timeout (maps to `Ok(0)`)
    Timeout,
    /// Peer closes the connection
    Eof,
}

/// Transport that replays a scripted event sequence
///
/// When the script runs out, reads behave like an idle connection (timeouts),
/// keeping the client in Connected state.
pub struct MockTransport {
    events: VecDeque<MockEvent>,
}

impl MockTransport {
    pub fn new(events: Vec<MockEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.events.pop_front() {
            Some(MockEvent::Data(bytes)) => {
                let n = bytes.len().min(buffer.len());
                buffer[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    // Put back what did not fit
                    self.events.push_front(MockEvent::Data(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            Some(MockEvent::Timeout) | None => {
                // Pace like a real read timeout would, without busy-spinning
                // the worker loop
                thread::sleep(Duration::from_millis(1));
                Ok(0)
            }
            Some(MockEvent::Eof) => Err(Error::Disconnected),
        }
    }
}

/// One scripted connect attempt
#[derive(Debug, Clone)]
pub enum MockConnect {
    /// Connect succeeds, serving this event script
    Serve(Vec<MockEvent>),
    /// Connect fails (refused/timeout)
    Fail,
}

/// Connector that steps through scripted connect outcomes
///
/// After the script is exhausted, further connects succeed with an idle
/// transport.
pub struct MockConnector {
    script: VecDeque<MockConnect>,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(script: Vec<MockConnect>) -> Self {
        Self {
            script: script.into(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of connect attempts, for assertions
    pub fn attempts(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

impl Connector for MockConnector {
    fn connect(&mut self) -> Result<Box<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        match self.script.pop_front() {
            Some(MockConnect::Serve(events)) => Ok(Box::new(MockTransport::new(events))),
            Some(MockConnect::Fail) => Err(Error::Other("mock connect refused".to_string())),
            None => Ok(Box::new(MockTransport::new(Vec::new()))),
        }
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_then_eof() {
        let mut transport = MockTransport::new(vec![
            MockEvent::Data(vec![1, 2, 3]),
            MockEvent::Eof,
        ]);

        let mut buf = [0u8; 8];
        assert_eq!(transport.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert!(matches!(transport.read(&mut buf), Err(Error::Disconnected)));
    }

    #[test]
    fn test_oversized_data_split_across_reads() {
        let mut transport = MockTransport::new(vec![MockEvent::Data(vec![9u8; 10])]);

        let mut buf = [0u8; 6];
        assert_eq!(transport.read(&mut buf).unwrap(), 6);
        assert_eq!(transport.read(&mut buf).unwrap(), 4);
    }

    #[test]
    fn test_connector_script() {
        let mut connector =
            MockConnector::new(vec![MockConnect::Fail, MockConnect::Serve(vec![])]);
        let attempts = connector.attempts();

        assert!(connector.connect().is_err());
        assert!(connector.connect().is_ok());
        assert_eq!(attempts.load(Ordering::Relaxed), 2);
    }
}
