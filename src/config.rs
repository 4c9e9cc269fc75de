//! Configuration for the NetraIO client
//!
//! Loads configuration from TOML file. Defaults carry the protocol constants
//! recovered by the discovery tooling (port probes, capture analysis) for the
//! current glasses firmware; none of them are authoritative, which is why
//! every framing constant lives here instead of in code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub motion: MotionConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

/// Network configuration (device address and timing)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Glasses IP on the NCM virtual ethernet link
    pub host: String,
    /// Motion telemetry TCP port
    pub motion_port: u16,
    /// Video stream TCP port
    pub video_port: u16,
    /// TCP connect timeout (ms)
    pub connect_timeout_ms: u64,
    /// Socket read timeout (ms) - bounds how long a blocking read can delay
    /// noticing a stop request
    pub read_timeout_ms: u64,
    /// Fixed delay before reconnecting after a transient failure (ms)
    pub reconnect_delay_ms: u64,
    /// Reconnect automatically after transient failures
    pub auto_reconnect: bool,
}

/// Motion stream framing and validity configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Known header signatures (hex strings). The device emits at least two
    /// variants; neither is guaranteed present on every message.
    pub headers: Vec<String>,
    /// Known footer signature (hex string)
    pub footer: String,
    /// Accumulator size limit before lossy resync
    pub buffer_cap: usize,
    /// Trailing bytes kept when the cap is exceeded
    pub resync_tail: usize,
    /// Envelope offsets tried before the full scan. Two values (20 and 168)
    /// have been observed on different firmware revisions; neither is
    /// verified, so these are an optimization, never ground truth.
    pub fast_path_offsets: Vec<usize>,
    /// Per-axis rotation-rate bound (rad/s), exclusive
    pub gyro_limit: f32,
    /// Acceleration-vector magnitude lower bound (m/s²), exclusive
    pub accel_min: f32,
    /// Acceleration-vector magnitude upper bound (m/s²), exclusive
    pub accel_max: f32,
}

/// Video stream geometry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoConfig {
    /// Fixed packet size on the wire
    pub packet_size: usize,
    /// Opaque header bytes before image data
    pub header_size: usize,
    /// Image width (fixed, not derived from the header)
    pub width: usize,
    /// Image height (fixed, not derived from the header)
    pub height: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration for the current glasses firmware
    ///
    /// Header/footer bytes and the video geometry come from capture analysis
    /// and are supplied here as configuration, not derived at runtime.
    pub fn glasses_defaults() -> Self {
        Self {
            network: NetworkConfig {
                host: "169.254.2.1".to_string(),
                motion_port: 52998,
                video_port: 52997,
                connect_timeout_ms: 5000,
                read_timeout_ms: 1000,
                reconnect_delay_ms: 2000,
                auto_reconnect: true,
            },
            motion: MotionConfig {
                headers: vec![
                    "283600000080".to_string(),
                    "273600000080".to_string(),
                ],
                footer: "000000cff753e3a59b0000db34b6d782de1b43".to_string(),
                buffer_cap: 10_000,
                resync_tail: 1_000,
                fast_path_offsets: vec![20, 168],
                gyro_limit: 10.0,
                accel_min: 9.0,
                accel_max: 11.0,
            },
            video: VideoConfig {
                packet_size: 193_862,
                header_size: 320,
                width: 512,
                height: 378,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }

    /// Check cross-field invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.motion.resync_tail >= self.motion.buffer_cap {
            return Err(Error::InvalidConfig(format!(
                "resync_tail ({}) must be smaller than buffer_cap ({})",
                self.motion.resync_tail, self.motion.buffer_cap
            )));
        }
        if self.motion.accel_min >= self.motion.accel_max {
            return Err(Error::InvalidConfig(
                "accel_min must be below accel_max".to_string(),
            ));
        }
        let image_end = self.video.header_size + self.video.width * self.video.height;
        if image_end > self.video.packet_size {
            return Err(Error::InvalidConfig(format!(
                "video geometry ({}x{} + {} header) exceeds packet size {}",
                self.video.width, self.video.height, self.video.header_size,
                self.video.packet_size
            )));
        }
        for h in &self.motion.headers {
            parse_hex(h)?;
        }
        parse_hex(&self.motion.footer)?;
        Ok(())
    }

    /// Parsed motion header signatures
    pub fn motion_headers(&self) -> Result<Vec<Vec<u8>>> {
        self.motion.headers.iter().map(|h| parse_hex(h)).collect()
    }

    /// Parsed motion footer signature
    pub fn motion_footer(&self) -> Result<Vec<u8>> {
        parse_hex(&self.motion.footer)
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::glasses_defaults()
    }
}

/// Parse a hex string ("283600000080") into bytes
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::InvalidConfig(format!(
            "hex string has odd length: {:?}",
            s
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| Error::InvalidConfig(format!("invalid hex string: {:?}", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::glasses_defaults();
        assert_eq!(config.network.host, "169.254.2.1");
        assert_eq!(config.network.motion_port, 52998);
        assert_eq!(config.network.video_port, 52997);
        assert_eq!(config.video.packet_size, 193_862);
        assert_eq!(config.video.width * config.video.height, 193_536);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hex_parsing() {
        let config = Config::glasses_defaults();
        let headers = config.motion_headers().unwrap();
        assert_eq!(headers[0], vec![0x28, 0x36, 0x00, 0x00, 0x00, 0x80]);
        assert_eq!(headers[1], vec![0x27, 0x36, 0x00, 0x00, 0x00, 0x80]);
        assert_eq!(config.motion_footer().unwrap().len(), 19);
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("123").is_err());
        assert!(parse_hex("2836").is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::glasses_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[motion]"));
        assert!(toml_string.contains("[video]"));
        assert!(toml_string.contains("[logging]"));

        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.network.host, config.network.host);
        assert_eq!(parsed.motion.fast_path_offsets, vec![20, 168]);
    }

    #[test]
    fn test_validation_rejects_bad_geometry() {
        let mut config = Config::glasses_defaults();
        config.video.width = 1280;
        config.video.height = 720;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_tail_above_cap() {
        let mut config = Config::glasses_defaults();
        config.motion.resync_tail = 20_000;
        assert!(config.validate().is_err());
    }
}
