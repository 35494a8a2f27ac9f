//! Snapcam Library
//!
//! A single-view camera snapshot widget: turn the camera on, watch a
//! live preview, and export a still frame as a PNG file named after the
//! moment it was taken.
//!
//! # Architecture
//!
//! The widget composes three responsibilities linearly:
//!
//! ```text
//! capture (stream + frames)
//!     → session (acquire / release, Off → Pending → On)
//!         → widget (toggle, preview binding, snapshot)
//!             → snapshot (raster + PNG + filename) → export (download sink)
//! ```
//!
//! # Design Principles
//!
//! - **One session**: at most one live hardware stream, exclusively
//!   owned by the widget instance
//! - **Stale grants never activate**: an acquisition that resolves after
//!   the user toggled off is closed on arrival
//! - **Snapshots are transient**: captured, exported, discarded
//! - **Failures are contained**: an acquisition failure is logged and
//!   leaves the widget usable
//!
//! # Example
//!
//! ```no_run
//! use snapcam::{
//!     capture::CaptureConfig,
//!     export::MemorySink,
//!     session::{MockSourceFactory, SessionState},
//!     widget::CameraWidget,
//! };
//! use std::sync::Arc;
//!
//! let mut widget = CameraWidget::new(Arc::new(MockSourceFactory), CaptureConfig::default());
//! let mut sink = MemorySink::new();
//!
//! // Turn the camera on and wait for the platform to grant the stream
//! widget.toggle_camera();
//! while widget.session_state() == SessionState::Pending {
//!     widget.tick();
//! }
//!
//! // Snapshot is only offered while the session is live
//! if widget.snapshot_available() {
//!     widget.capture_snapshot(&mut sink).unwrap();
//! }
//!
//! // Turn the camera off; the stream is stopped and the preview unbound
//! widget.toggle_camera();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod export;
pub mod session;
pub mod snapshot;
pub mod terminal;
pub mod widget;

// Re-export commonly used types at crate root
pub use capture::{CameraError, CameraSource, CaptureConfig, FileConfig, Frame, MockCamera};
pub use export::{DiskSink, DownloadRequest, DownloadSink, MemorySink};
pub use session::{MockSourceFactory, SessionManager, SessionState, SourceFactory};
pub use snapshot::{Snapshot, SnapshotError};
pub use widget::{CameraWidget, WidgetError};

#[cfg(feature = "camera")]
pub use capture::NokhwaCamera;
#[cfg(feature = "camera")]
pub use session::NokhwaSourceFactory;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
