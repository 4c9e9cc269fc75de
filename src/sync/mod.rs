//! Frame synchronization strategies
//!
//! The glasses streams are not self-describing: declared header/footer
//! markers are sometimes absent or shifted. Each strategy here locates a byte
//! range inside the accumulator that plausibly contains one decodable sample;
//! the caller decodes it and advances the buffer past the consumed bytes.

mod fixed;
mod scan;
mod signature;

pub use fixed::FixedPacketSync;
pub use scan::ScanSync;
pub use signature::SignatureSync;

use crate::config::MotionConfig;

/// Byte range within the stream buffer hypothesized to encode one sample
///
/// `start + len` is the consumed length: everything up to and including the
/// frame is dropped from the buffer once the frame is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub start: usize,
    pub len: usize,
}

impl FrameSpan {
    /// End of the frame, exclusive; also the number of bytes to consume
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Strategy for locating one candidate frame in the buffered bytes
pub trait FrameSync: Send {
    /// Find the next candidate frame, or None if the caller must wait for
    /// more data. Must not inspect bytes past the end of `buf`.
    fn find_frame(&self, buf: &[u8]) -> Option<FrameSpan>;
}

/// Content-based validity test for a candidate motion payload
///
/// Doubles as protocol framing when markers are unreliable, so it is a
/// pluggable strategy: alternate devices or firmware revisions supply a
/// different window without touching the synchronizer.
pub trait Plausibility: Send + Sync {
    /// Accept or reject six decoded floats ordered {gyro xyz, accel xyz}
    fn accept(&self, values: &[f32; 6]) -> bool;
}

/// Default predicate: per-axis rotation bound plus gravity-magnitude window
///
/// A device at rest (or in normal head motion) reports an acceleration
/// vector close to 1 g; random bytes reinterpreted as floats almost never
/// do. The bounds are acceptance heuristics, not physical constraints.
#[derive(Debug, Clone, Copy)]
pub struct GravityWindow {
    pub gyro_limit: f32,
    pub accel_min: f32,
    pub accel_max: f32,
}

impl GravityWindow {
    pub fn from_config(config: &MotionConfig) -> Self {
        Self {
            gyro_limit: config.gyro_limit,
            accel_min: config.accel_min,
            accel_max: config.accel_max,
        }
    }
}

impl Plausibility for GravityWindow {
    fn accept(&self, values: &[f32; 6]) -> bool {
        let gyro_ok = values[..3]
            .iter()
            .all(|v| v.is_finite() && v.abs() < self.gyro_limit);
        if !gyro_ok {
            return false;
        }
        let mag = (values[3].powi(2) + values[4].powi(2) + values[5].powi(2)).sqrt();
        mag.is_finite() && mag > self.accel_min && mag < self.accel_max
    }
}
