//! Still-frame snapshot capture and PNG encoding.
//!
//! A snapshot is transient: it is produced from the current live frame,
//! handed to the export step, and discarded. Nothing here retains pixel
//! data beyond the export call.

use crate::capture::Frame;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use image::RgbImage;
use thiserror::Error;

/// Prefix of every snapshot payload rendered as a data URI.
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Errors that can occur while producing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The live frame reported zero intrinsic width or height, which
    /// happens when a snapshot is requested before the stream has
    /// produced a real frame. Guarded explicitly rather than writing a
    /// degenerate 0x0 image.
    #[error("live frame has zero intrinsic dimensions")]
    EmptyFrame,
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// A still frame captured from the live preview, already PNG-encoded.
pub struct Snapshot {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl Snapshot {
    /// Captures a snapshot from the given live frame.
    ///
    /// Draws the frame into an offscreen raster sized exactly to the
    /// frame's intrinsic width and height, then encodes it as lossless
    /// PNG.
    pub fn from_frame(frame: &Frame) -> Result<Self, SnapshotError> {
        if frame.is_empty() {
            return Err(SnapshotError::EmptyFrame);
        }

        let raster: RgbImage = RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
            let (r, g, b) = frame.pixel_rgb(x, y);
            image::Rgb([r, g, b])
        });

        let mut png = Vec::new();
        raster
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| SnapshotError::Encode(e.to_string()))?;

        tracing::debug!(
            width = frame.width(),
            height = frame.height(),
            png_bytes = png.len(),
            "Snapshot encoded"
        );

        Ok(Self {
            width: frame.width(),
            height: frame.height(),
            png,
        })
    }

    /// Returns the raster width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the raster height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the encoded PNG bytes.
    #[inline]
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Consumes the snapshot, yielding the encoded PNG bytes.
    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    /// Renders the snapshot as a `data:image/png;base64,` URI.
    pub fn data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&self.png))
    }
}

/// Derives the snapshot filename for the given instant.
///
/// The name is `photo_<timestamp>.png`, where `<timestamp>` is the UTC
/// ISO-8601 representation at millisecond precision with every colon,
/// period, and hyphen removed. The result contains only letters, digits,
/// and underscore, and sorts lexicographically by time.
pub fn filename_at(instant: DateTime<Utc>) -> String {
    let iso = instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    let stripped: String = iso.chars().filter(|c| !matches!(c, ':' | '.' | '-')).collect();
    format!("photo_{}.png", stripped)
}

/// Derives the snapshot filename for the current moment.
pub fn filename_now() -> String {
    filename_at(Utc::now())
}
