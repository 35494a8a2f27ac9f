//! Camera input and frame handling.
//!
//! This module provides abstractions for acquiring a video-only camera
//! stream and pulling frames from it. The session manager and the
//! snapshot exporter sit on top of these types.

mod camera;
mod config;
mod frame;

#[cfg(feature = "camera")]
mod nokhwa;

pub use camera::{CameraError, CameraSource, MockCamera};
pub use config::{CaptureConfig, ConfigError, FileConfig, OutputConfig};
pub use frame::{Frame, BYTES_PER_PIXEL};

#[cfg(feature = "camera")]
pub use self::nokhwa::NokhwaCamera;
