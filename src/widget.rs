//! The camera widget.
//!
//! Orchestrates the three responsibilities of the system: the device
//! session manager, the preview binding, and the snapshot exporter. All
//! mutable state lives on the widget instance and is reachable only
//! through the operations below.

use crate::capture::{CameraError, CaptureConfig, Frame};
use crate::export::{DownloadRequest, DownloadSink, ExportError};
use crate::session::{SessionManager, SessionState, SourceFactory};
use crate::snapshot::{self, Snapshot, SnapshotError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by widget operations.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("snapshot requested while the camera is off")]
    CameraOff,
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Single-instance camera widget.
///
/// `camera_on` is user intent: it flips on every toggle regardless of
/// whether acquisition later succeeds. The session state is the ground
/// truth for what the hardware is doing; an acquisition failure leaves
/// intent as the user last set it and only logs a diagnostic.
pub struct CameraWidget {
    camera_on: bool,
    session: SessionManager,
    preview: Option<Frame>,
}

impl CameraWidget {
    /// Creates a widget in the off state.
    pub fn new(factory: Arc<dyn SourceFactory>, config: CaptureConfig) -> Self {
        Self {
            camera_on: false,
            session: SessionManager::new(factory, config),
            preview: None,
        }
    }

    /// Returns the user's on/off intent.
    pub fn camera_on(&self) -> bool {
        self.camera_on
    }

    /// Returns the session state (ground truth for the hardware stream).
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Label for the power toggle control.
    pub fn toggle_label(&self) -> &'static str {
        if self.camera_on {
            "Turn Off Camera"
        } else {
            "Turn On Camera"
        }
    }

    /// Inverts the power state.
    ///
    /// Off-to-on requests stream acquisition; on-to-off releases the
    /// session and unbinds the preview.
    pub fn toggle_camera(&mut self) {
        self.camera_on = !self.camera_on;
        if self.camera_on {
            self.session.request_acquire();
        } else {
            self.session.release();
            self.preview = None;
        }
    }

    /// Drives the widget one step: resolves a pending acquisition if the
    /// platform has answered, and refreshes the preview binding from the
    /// live stream. Call once per event-loop iteration.
    pub fn tick(&mut self) {
        self.session.poll();
        if self.session.is_active() {
            match self.session.current_frame() {
                Ok(frame) => self.preview = Some(frame),
                Err(e) => tracing::warn!("Preview frame capture failed: {}", e),
            }
        }
    }

    /// The frame currently bound to the preview surface, if any.
    pub fn preview_frame(&self) -> Option<&Frame> {
        self.preview.as_ref()
    }

    /// Whether the snapshot control should be offered to the user.
    ///
    /// The UI contract suppresses the control unless a live session is
    /// active; `capture_snapshot` additionally enforces it.
    pub fn snapshot_available(&self) -> bool {
        self.session.is_active()
    }

    /// Captures a still frame and hands it to the download sink.
    ///
    /// Sizes the offscreen raster to the live frame's intrinsic
    /// dimensions, encodes PNG, derives the timestamp filename, and
    /// saves. The snapshot is not retained afterwards.
    pub fn capture_snapshot(&mut self, sink: &mut dyn DownloadSink) -> Result<PathBuf, WidgetError> {
        if !self.session.is_active() {
            return Err(WidgetError::CameraOff);
        }

        let frame = self.session.current_frame()?;
        let snapshot = Snapshot::from_frame(&frame)?;
        let request = DownloadRequest::new(snapshot::filename_now(), snapshot.into_png_bytes());
        let path = sink.save(&request)?;
        Ok(path)
    }
}
