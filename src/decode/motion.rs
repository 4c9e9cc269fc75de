//! Motion sample decoding
//!
//! The payload is 24 bytes: six little-endian f32 ordered
//! {gyro x, y, z, accel x, y, z}, somewhere within a device-specific
//! envelope. The decoder re-applies the plausibility predicate even when the
//! synchronizer already accepted the frame: signature framing says nothing
//! about content, and a shifted envelope produces well-formed garbage.

use super::Decoder;
use crate::sync::Plausibility;
use crate::types::MotionSample;
use std::sync::Arc;

/// Motion payload size: 6 floats * 4 bytes
pub const MOTION_PAYLOAD_SIZE: usize = 24;

/// Decode 24 bytes as six little-endian f32
pub fn read_floats(bytes: &[u8]) -> Option<[f32; 6]> {
    if bytes.len() < MOTION_PAYLOAD_SIZE {
        return None;
    }
    let mut values = [0f32; 6];
    for (i, value) in values.iter_mut().enumerate() {
        let off = i * 4;
        *value = f32::from_le_bytes([
            bytes[off],
            bytes[off + 1],
            bytes[off + 2],
            bytes[off + 3],
        ]);
    }
    Some(values)
}

/// Decoder for motion telemetry frames
pub struct MotionDecoder {
    predicate: Arc<dyn Plausibility>,
    fast_path_offsets: Vec<usize>,
}

impl MotionDecoder {
    pub fn new(predicate: Arc<dyn Plausibility>, fast_path_offsets: Vec<usize>) -> Self {
        Self {
            predicate,
            fast_path_offsets,
        }
    }

    fn validate(&self, bytes: &[u8]) -> Option<MotionSample> {
        let values = read_floats(bytes)?;
        if !self.predicate.accept(&values) {
            return None;
        }
        Some(MotionSample::new(
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
        ))
    }
}

impl Decoder for MotionDecoder {
    type Output = MotionSample;

    fn decode(&self, frame: &[u8]) -> Option<MotionSample> {
        // A bare payload (content-scan frame) decodes directly
        if frame.len() == MOTION_PAYLOAD_SIZE {
            return self.validate(frame);
        }

        // Signature-framed envelope: try the known payload offsets, then
        // fall back to an aligned search of the whole message
        for &offset in &self.fast_path_offsets {
            if let Some(end) = offset.checked_add(MOTION_PAYLOAD_SIZE) {
                if end <= frame.len() {
                    if let Some(sample) = self.validate(&frame[offset..end]) {
                        return Some(sample);
                    }
                }
            }
        }

        if frame.len() < MOTION_PAYLOAD_SIZE {
            return None;
        }
        let last = frame.len() - MOTION_PAYLOAD_SIZE;
        for offset in (0..=last).step_by(4) {
            if let Some(sample) = self.validate(&frame[offset..offset + MOTION_PAYLOAD_SIZE]) {
                return Some(sample);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::GravityWindow;

    fn decoder() -> MotionDecoder {
        let window = GravityWindow {
            gyro_limit: 10.0,
            accel_min: 9.0,
            accel_max: 11.0,
        };
        MotionDecoder::new(Arc::new(window), vec![20, 168])
    }

    fn encode(values: &[f32; 6]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    const VALID: [f32; 6] = [0.5, -0.25, 1.0, 0.1, -0.3, 9.8];

    #[test]
    fn test_bare_payload_round_trip() {
        let sample = decoder().decode(&encode(&VALID)).unwrap();
        // Bit-exact recovery of the original floats
        assert_eq!(sample.gyro, [0.5, -0.25, 1.0]);
        assert_eq!(sample.accel, [0.1, -0.3, 9.8]);
    }

    #[test]
    fn test_rejects_implausible_even_when_well_formed() {
        // Exactly 24 aligned bytes, but accel magnitude outside (9, 11)
        let low = encode(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(decoder().decode(&low).is_none());

        let high = encode(&[0.0, 0.0, 0.0, 0.0, 0.0, 20.0]);
        assert!(decoder().decode(&high).is_none());
    }

    #[test]
    fn test_envelope_fast_path_offset() {
        // Payload at envelope offset 20, as one observed firmware lays it out
        let mut envelope = vec![0u8; 20];
        envelope.extend_from_slice(&encode(&VALID));
        envelope.extend_from_slice(&[0u8; 26]);

        let sample = decoder().decode(&envelope).unwrap();
        assert_eq!(sample.accel, [0.1, -0.3, 9.8]);
    }

    #[test]
    fn test_envelope_search_fallback() {
        // Payload at an offset neither fast path expects
        let mut envelope = vec![0u8; 48];
        envelope.extend_from_slice(&encode(&VALID));

        let sample = decoder().decode(&envelope).unwrap();
        assert_eq!(sample.gyro, [0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_short_frame_rejected() {
        assert!(decoder().decode(&[0u8; 10]).is_none());
    }
}
