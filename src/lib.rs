//! NetraIO - streaming client library for AR-glasses telemetry
//!
//! Connects to the glasses over their NCM virtual ethernet link and keeps
//! two proprietary TCP streams alive: motion telemetry (gyro + accel) and
//! fixed-packet grayscale video. The wire formats are only partially
//! understood, so frame location combines signature framing with a
//! content-based plausibility check, and every failure short of an explicit
//! `stop()` is treated as recoverable.

pub mod buffer;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod sync;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use client::StreamClient;
pub use config::Config;
pub use error::{Error, Result};
pub use types::{ConnectionState, MotionSample, VideoFrame};
