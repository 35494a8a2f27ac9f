//! Real camera backend using nokhwa.
//!
//! Only compiled with the `camera` feature. Everything above this
//! module talks to [`CameraSource`], so the mock and the real backend
//! are interchangeable.

use super::{CameraError, CameraSource, CaptureConfig, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;

/// Camera source backed by a real capture device.
#[derive(Default)]
pub struct NokhwaCamera {
    inner: Option<Camera>,
    sequence: u64,
}

impl NokhwaCamera {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraSource for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.fps,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        let resolution = camera.resolution();
        tracing::info!(
            device = config.device_id,
            width = resolution.width(),
            height = resolution.height(),
            "Camera stream opened"
        );

        self.inner = Some(camera);
        self.sequence = 0;
        Ok(())
    }

    fn frame(&mut self) -> Result<Frame, CameraError> {
        let camera = self.inner.as_mut().ok_or(CameraError::NotOpen)?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        self.sequence += 1;
        Ok(Frame::new(decoded.into_raw(), width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.inner.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
            tracing::info!("Camera stream closed");
        }
    }
}
