//! Client counters
//!
//! Decode failures and resyncs do not surface as errors; these counters
//! (and the logs) are how that noise stays observable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the worker thread
#[derive(Debug, Default)]
pub struct ClientStats {
    pub(crate) samples_decoded: AtomicU64,
    pub(crate) bytes_received: AtomicU64,
    pub(crate) connect_failures: AtomicU64,
    pub(crate) disconnects: AtomicU64,
    pub(crate) resyncs: AtomicU64,
}

impl ClientStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_decoded: self.samples_decoded.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            resyncs: self.resyncs.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the client counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Samples delivered to the cache/callback
    pub samples_decoded: u64,
    /// Raw bytes read from the socket
    pub bytes_received: u64,
    /// Failed connect attempts
    pub connect_failures: u64,
    /// Connections lost after being established
    pub disconnects: u64,
    /// Lossy buffer truncations
    pub resyncs: u64,
}
