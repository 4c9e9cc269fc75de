//! Sample decoders
//!
//! Decoders are pure functions over a candidate byte range: no socket or
//! timing side effects. A rejection is ordinary control flow (the stream is
//! noisy by nature), so `decode` returns Option rather than an error.

mod motion;
mod video;

pub use motion::{read_floats, MotionDecoder, MOTION_PAYLOAD_SIZE};
pub use video::VideoDecoder;

/// Converts a located byte range into a typed sample
pub trait Decoder: Send {
    type Output;

    /// Decode and validate one candidate frame; None rejects it
    fn decode(&self, frame: &[u8]) -> Option<Self::Output>;
}
