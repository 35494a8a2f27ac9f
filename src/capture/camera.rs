//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, Frame, BYTES_PER_PIXEL};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera is busy or in use: {0}")]
    Busy(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not open")]
    NotOpen,
}

/// Trait for camera stream implementations.
///
/// One open source corresponds to one live hardware stream. Closing
/// stops the stream and releases the hardware; close is idempotent.
pub trait CameraSource {
    /// Opens the video-only stream with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures the current frame from the live stream.
    fn frame(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the stream is currently open.
    fn is_open(&self) -> bool;

    /// Stops the stream and releases the underlying hardware.
    fn close(&mut self);
}

/// Mock camera for testing that generates synthetic frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraSource for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn frame(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotOpen)?;

        // Deterministic moving gradient so the preview visibly animates
        let width = config.width;
        let height = config.height;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        let shift = (self.sequence % 256) as u32;
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x + shift) % 256) as u8);
                pixels.push((y % 256) as u8);
                pixels.push(((x + y) % 256) as u8);
            }
        }

        self.sequence += 1;
        Ok(Frame::new(pixels, width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::default();

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());

        let frame = camera.frame().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.frame().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.close();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(camera.frame(), Err(CameraError::NotOpen)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut camera = MockCamera::new();
        camera.open(&CaptureConfig::default()).unwrap();
        camera.close();
        camera.close();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_frame_matches_configured_dimensions() {
        let mut camera = MockCamera::new();
        camera
            .open(&CaptureConfig::with_dimensions(320, 240))
            .unwrap();
        let frame = camera.frame().unwrap();
        assert_eq!(frame.width(), 320);
        assert_eq!(frame.height(), 240);
        assert!(frame.is_valid());
    }
}
