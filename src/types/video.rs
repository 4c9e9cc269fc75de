//! Video frame types

/// One decoded grayscale camera frame
///
/// Pixels are stored row-major, one byte per pixel. The wire format carries
/// only 4 bits per pixel; decoded values are always multiples of 17
/// (0, 17, ... 255).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame from decoded pixels
    ///
    /// Panics in debug builds if the pixel count does not match the
    /// geometry; the decoder guarantees it in release.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Pixel value at (x, y), or None outside the grid
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Mean pixel value, useful as a cheap exposure/health metric
    pub fn mean_luma(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.pixels.iter().map(|&p| p as u64).sum();
        sum as f32 / self.pixels.len() as f32
    }
}
