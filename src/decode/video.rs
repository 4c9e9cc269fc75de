//! Video frame decoding
//!
//! Each fixed-size packet carries an opaque header followed by one byte per
//! pixel, with the grayscale sample in the high nibble. Scaling by 17 maps
//! the 4-bit range 0-15 linearly onto 0-255.

use super::Decoder;
use crate::config::VideoConfig;
use crate::types::VideoFrame;

/// Decoder for fixed-size grayscale video packets
pub struct VideoDecoder {
    header_size: usize,
    width: usize,
    height: usize,
}

impl VideoDecoder {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            header_size: config.header_size,
            width: config.width,
            height: config.height,
        }
    }
}

impl Decoder for VideoDecoder {
    type Output = VideoFrame;

    fn decode(&self, frame: &[u8]) -> Option<VideoFrame> {
        let image_size = self.width * self.height;
        let end = self.header_size.checked_add(image_size)?;
        if frame.len() < end {
            log::debug!(
                "Video packet too short: {} bytes, need {}",
                frame.len(),
                end
            );
            return None;
        }

        let pixels: Vec<u8> = frame[self.header_size..end]
            .iter()
            .map(|&b| ((b >> 4) & 0x0F) * 17)
            .collect();

        Some(VideoFrame::new(self.width, self.height, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VideoConfig {
        VideoConfig {
            packet_size: 4 * 3 + 16,
            header_size: 16,
            width: 4,
            height: 3,
        }
    }

    #[test]
    fn test_high_nibble_unpack() {
        let cfg = config();
        let mut packet = vec![0xFFu8; 16]; // opaque header, ignored
        // Image bytes: pixel value in high nibble, noise in low nibble
        for i in 0..12u8 {
            packet.push((i << 4) | 0x07);
        }

        let frame = VideoDecoder::new(&cfg).decode(&packet).unwrap();
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 3);
        for i in 0..12usize {
            let (x, y) = (i % 4, i / 4);
            assert_eq!(frame.pixel(x, y), Some((i as u8) * 17));
        }
    }

    #[test]
    fn test_known_pixel_position() {
        let cfg = config();
        let mut packet = vec![0u8; 16 + 12];
        // Byte for pixel (2, 1) = index 6 after the header
        packet[16 + 6] = 0xA3;

        let frame = VideoDecoder::new(&cfg).decode(&packet).unwrap();
        assert_eq!(frame.pixel(2, 1), Some(0x0A * 17));
        assert_eq!(frame.pixel(0, 0), Some(0));
    }

    #[test]
    fn test_full_scale_mapping() {
        let cfg = config();
        let mut packet = vec![0u8; 16 + 12];
        packet[16] = 0xF0;

        let frame = VideoDecoder::new(&cfg).decode(&packet).unwrap();
        assert_eq!(frame.pixel(0, 0), Some(255));
    }

    #[test]
    fn test_short_packet_rejected() {
        let cfg = config();
        assert!(VideoDecoder::new(&cfg).decode(&[0u8; 20]).is_none());
    }

    #[test]
    fn test_device_geometry_counts() {
        // Production constants: 320-byte header + 512*378 pixels fit the
        // literal packet size with 6 spare bytes
        let cfg = VideoConfig {
            packet_size: 193_862,
            header_size: 320,
            width: 512,
            height: 378,
        };
        assert!(cfg.header_size + cfg.width * cfg.height <= cfg.packet_size);

        let packet = vec![0x50u8; cfg.packet_size];
        let frame = VideoDecoder::new(&cfg).decode(&packet).unwrap();
        assert_eq!(frame.pixels.len(), 193_536);
        assert_eq!(frame.pixel(511, 377), Some(5 * 17));
    }
}
