//! Client-side download seam.
//!
//! The original surface for this concern is "hand the platform a
//! filename and a payload, let its default download handling save the
//! file". [`DownloadSink`] is that seam; the disk sink writes into a
//! photos directory, and tests substitute an in-memory sink.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while saving a snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to save snapshot: {0}")]
    Save(#[from] io::Error),
}

/// An ephemeral download request.
///
/// Exists only for the duration of the save call; nothing retains it
/// afterwards.
pub struct DownloadRequest {
    /// Timestamp-derived filename, e.g. `photo_20240102T030405678Z.png`.
    pub filename: String,
    /// Encoded PNG payload.
    pub payload: Vec<u8>,
}

impl DownloadRequest {
    /// Creates a request from a filename and an encoded payload.
    pub fn new(filename: String, payload: Vec<u8>) -> Self {
        Self { filename, payload }
    }
}

/// Destination for snapshot downloads.
pub trait DownloadSink {
    /// Saves the request's payload under its filename.
    ///
    /// Returns the location the payload ended up at.
    fn save(&mut self, request: &DownloadRequest) -> Result<PathBuf, ExportError>;
}

/// Sink that writes snapshots into a photos directory on disk.
///
/// The directory is created on first save if it does not exist.
pub struct DiskSink {
    photos_dir: PathBuf,
}

impl DiskSink {
    /// Creates a sink targeting the given directory.
    pub fn new(photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
        }
    }

    /// Returns the target directory.
    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }
}

impl DownloadSink for DiskSink {
    fn save(&mut self, request: &DownloadRequest) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.photos_dir)?;
        let path = self.photos_dir.join(&request.filename);
        fs::write(&path, &request.payload)?;
        tracing::info!(path = %path.display(), "Snapshot saved");
        Ok(path)
    }
}

/// In-memory sink recording every save, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Every saved (filename, payload) pair in order.
    pub saved: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, request: &DownloadRequest) -> Result<PathBuf, ExportError> {
        self.saved
            .push((request.filename.clone(), request.payload.clone()));
        Ok(PathBuf::from(&request.filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_saves() {
        let mut sink = MemorySink::new();
        let request = DownloadRequest::new("photo_x.png".into(), vec![1, 2, 3]);

        let path = sink.save(&request).unwrap();
        assert_eq!(path, PathBuf::from("photo_x.png"));
        assert_eq!(sink.saved.len(), 1);
        assert_eq!(sink.saved[0].1, vec![1, 2, 3]);
    }

    #[test]
    fn test_disk_sink_creates_directory_and_writes() {
        let dir = std::env::temp_dir().join(format!("snapcam-export-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut sink = DiskSink::new(&dir);
        let request = DownloadRequest::new("photo_y.png".into(), vec![9, 9]);

        let path = sink.save(&request).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![9, 9]);

        let _ = fs::remove_dir_all(&dir);
    }
}
