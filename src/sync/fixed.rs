//! Fixed-size packet framing
//!
//! The video stream delivers packets of one literal size back to back. A
//! frame is accepted as soon as the buffer holds a full packet; no content
//! validation is done, the format's self-consistency is assumed from the
//! packet size.

use super::{FrameSpan, FrameSync};

/// Synchronizer for streams of fixed-size packets
pub struct FixedPacketSync {
    packet_size: usize,
}

impl FixedPacketSync {
    pub fn new(packet_size: usize) -> Self {
        Self { packet_size }
    }
}

impl FrameSync for FixedPacketSync {
    fn find_frame(&self, buf: &[u8]) -> Option<FrameSpan> {
        if buf.len() >= self.packet_size {
            Some(FrameSpan {
                start: 0,
                len: self.packet_size,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_full_packet() {
        let sync = FixedPacketSync::new(100);
        assert!(sync.find_frame(&[0u8; 99]).is_none());

        let span = sync.find_frame(&[0u8; 100]).unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.len, 100);
    }

    #[test]
    fn test_extra_bytes_left_for_next_frame() {
        let sync = FixedPacketSync::new(100);
        let span = sync.find_frame(&[0u8; 250]).unwrap();
        // Only one packet at a time; the remainder stays buffered
        assert_eq!(span.end(), 100);
    }
}
