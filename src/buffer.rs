//! Bounded accumulator for raw stream bytes
//!
//! The motion stream has no reliable framing, so undecodable bytes pile up
//! whenever the synchronizer cannot find a frame. Rather than growing without
//! bound or blocking the producer, the buffer drops its oldest bytes once a
//! configured cap is exceeded, keeping only a trailing window that may still
//! contain a partial frame.

/// Bounded byte accumulator with a lossy resync policy
pub struct StreamBuffer {
    data: Vec<u8>,
    cap: usize,
    tail: usize,
    resyncs: u64,
}

impl StreamBuffer {
    /// Create a buffer that truncates to `tail` trailing bytes whenever its
    /// length exceeds `cap` without a successful decode.
    pub fn new(cap: usize, tail: usize) -> Self {
        assert!(tail < cap, "resync tail must be smaller than cap");
        Self {
            data: Vec::with_capacity(cap),
            cap,
            tail,
            resyncs: 0,
        }
    }

    /// Append received bytes, enforcing the cap/tail policy
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        if self.data.len() > self.cap {
            let dropped = self.data.len() - self.tail;
            self.data.drain(..dropped);
            self.resyncs += 1;
            log::warn!(
                "Stream resync: dropped {} stale bytes (kept {} tail, {} resyncs total)",
                dropped,
                self.tail,
                self.resyncs
            );
        }
    }

    /// Drop the first `n` bytes (a consumed frame)
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.data.len());
        self.data.drain(..n);
    }

    /// Drop everything, e.g. after a disconnect
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View of the buffered bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of lossy truncations since creation
    pub fn resync_count(&self) -> u64 {
        self.resyncs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_consume() {
        let mut buf = StreamBuffer::new(64, 8);
        buf.append(&[1, 2, 3, 4, 5]);
        assert_eq!(buf.len(), 5);

        buf.consume(2);
        assert_eq!(buf.as_slice(), &[3, 4, 5]);

        buf.consume(10); // over-consume is clamped
        assert!(buf.is_empty());
    }

    #[test]
    fn test_cap_truncates_to_tail() {
        let mut buf = StreamBuffer::new(16, 4);
        buf.append(&[0u8; 16]);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.resync_count(), 0);

        // One more byte pushes past the cap; only the tail survives
        buf.append(&[0xAB]);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.resync_count(), 1);
        assert_eq!(buf.as_slice()[3], 0xAB);
    }

    #[test]
    fn test_tail_preserves_recent_bytes() {
        let mut buf = StreamBuffer::new(8, 3);
        buf.append(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        // Trailing window holds the most recent bytes in order
        assert_eq!(buf.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn test_length_never_exceeds_cap() {
        let mut buf = StreamBuffer::new(100, 10);
        for chunk in 0..50 {
            buf.append(&[chunk as u8; 37]);
            // After every append the length is bounded by the cap
            assert!(buf.len() <= 100);
        }
        assert!(buf.resync_count() > 0);
    }
}
