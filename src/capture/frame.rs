//! Frame type representing a captured image with metadata.

/// Bytes per pixel for RGB24 frames.
pub const BYTES_PER_PIXEL: usize = 3;

/// A single captured frame from the camera.
///
/// Pixel data is packed RGB24 at the frame's intrinsic resolution.
/// The snapshot exporter and the preview surface both sample frames
/// in this one format.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB24 pixel data.
    pixels: Vec<u8>,
    /// Intrinsic frame width in pixels.
    width: u32,
    /// Intrinsic frame height in pixels.
    height: u32,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            sequence,
        }
    }

    /// Returns a reference to the packed RGB24 pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the intrinsic frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the intrinsic frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns true if the frame has no intrinsic area (zero width or height).
    ///
    /// A source can report such a frame before it has produced real data;
    /// the snapshot exporter refuses to encode one.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Samples the pixel at (x, y), clamping out-of-range coordinates
    /// to the frame edge.
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.is_empty() {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * BYTES_PER_PIXEL;
        if idx + 2 < self.pixels.len() {
            (self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// Validates that the pixel buffer size matches the intrinsic dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == (self.width as usize) * (self.height as usize) * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480 * BYTES_PER_PIXEL];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_zero_dimension_frame_is_empty() {
        let frame = Frame::new(Vec::new(), 0, 0, 1);
        assert!(frame.is_empty());
        assert_eq!(frame.pixel_rgb(5, 5), (0, 0, 0));
    }

    #[test]
    fn test_pixel_sampling_clamps_to_edge() {
        let mut pixels = vec![0u8; 2 * 2 * BYTES_PER_PIXEL];
        // Bottom-right pixel is red
        let last = pixels.len() - BYTES_PER_PIXEL;
        pixels[last] = 255;
        let frame = Frame::new(pixels, 2, 2, 1);

        assert_eq!(frame.pixel_rgb(1, 1), (255, 0, 0));
        // Out-of-range clamps to the same pixel
        assert_eq!(frame.pixel_rgb(100, 100), (255, 0, 0));
    }
}
