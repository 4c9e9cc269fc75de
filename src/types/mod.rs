//! Data types shared across the client

mod motion;
mod state;
mod video;

pub use motion::MotionSample;
pub use state::ConnectionState;
pub use video::VideoFrame;
