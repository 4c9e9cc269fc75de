//! Heuristic content scan
//!
//! Primary strategy for the motion stream. The declared envelope markers are
//! unreliable, so instead of trusting them this strategy slides a 4-byte
//! aligned window across the buffer and accepts the first offset whose 24
//! bytes decode to six plausible little-endian floats.

use super::{FrameSpan, FrameSync, Plausibility};
use crate::decode::read_floats;
use crate::decode::MOTION_PAYLOAD_SIZE;
use std::sync::Arc;

/// Window advance step; float payloads have only been observed 4-byte aligned
const SCAN_STEP: usize = 4;

/// Aligned sliding-window synchronizer with a pluggable validity predicate
pub struct ScanSync {
    predicate: Arc<dyn Plausibility>,
    /// Envelope offsets tried before the scan. Purely an optimization: a
    /// miss falls through to the scan, a stale offset is rejected by the
    /// predicate. See the fast-path note in the crate config.
    fast_path_offsets: Vec<usize>,
}

impl ScanSync {
    pub fn new(predicate: Arc<dyn Plausibility>, fast_path_offsets: Vec<usize>) -> Self {
        Self {
            predicate,
            fast_path_offsets,
        }
    }

    fn payload_at(&self, buf: &[u8], offset: usize) -> Option<[f32; 6]> {
        let end = offset.checked_add(MOTION_PAYLOAD_SIZE)?;
        if end > buf.len() {
            return None;
        }
        let values = read_floats(&buf[offset..end])?;
        if self.predicate.accept(&values) {
            Some(values)
        } else {
            None
        }
    }
}

impl FrameSync for ScanSync {
    fn find_frame(&self, buf: &[u8]) -> Option<FrameSpan> {
        if buf.len() < MOTION_PAYLOAD_SIZE {
            return None;
        }

        // Fast path: known envelope offsets from previous firmware analysis
        for &offset in &self.fast_path_offsets {
            if self.payload_at(buf, offset).is_some() {
                return Some(FrameSpan {
                    start: offset,
                    len: MOTION_PAYLOAD_SIZE,
                });
            }
        }

        // Full scan, lowest valid offset wins
        let last = buf.len() - MOTION_PAYLOAD_SIZE;
        for offset in (0..=last).step_by(SCAN_STEP) {
            if self.payload_at(buf, offset).is_some() {
                return Some(FrameSpan {
                    start: offset,
                    len: MOTION_PAYLOAD_SIZE,
                });
            }
        }

        None
    }
}
