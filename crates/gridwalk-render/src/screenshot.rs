//! Writing rendered frames to image files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use gridwalk_core::{Error, Result};
use image::{ImageBuffer, Rgba};
use thiserror::Error as ThisError;
use tracing::info;

use crate::frame::Frame;

/// Which frames to save, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotConfig {
    /// Output path pattern, `{}` is replaced by the frame index.
    pub output_pattern: String,
    /// Frame indices to save, in ascending order.
    pub frames: BTreeSet<u64>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            output_pattern: "frame_{}.png".to_string(),
            frames: BTreeSet::from([0]),
        }
    }
}

impl ScreenshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output path pattern.
    pub fn with_output(mut self, pattern: impl Into<String>) -> Self {
        self.output_pattern = pattern.into();
        self
    }

    /// Replace the set of frames to save.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.frames = frames.into_iter().collect();
        self
    }

    /// Output path for a specific frame.
    pub fn output_path(&self, frame: u64) -> PathBuf {
        PathBuf::from(self.output_pattern.replace("{}", &frame.to_string()))
    }

    /// Check if a frame should be saved.
    pub fn should_capture(&self, frame: u64) -> bool {
        self.frames.contains(&frame)
    }

    /// Last frame that needs rendering, if any.
    pub fn last_frame(&self) -> Option<u64> {
        self.frames.last().copied()
    }
}

/// Parse frame indices from a string like "0,5,10-15,20".
///
/// Ranges are inclusive. Empty entries are skipped; anything else that is
/// not a number or a `start-end` range with `start <= end` is an error.
pub fn parse_frame_indices(s: &str) -> Result<BTreeSet<u64>> {
    let mut frames = BTreeSet::new();

    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| Error::InvalidData(format!("bad frame index '{v}': {e}")))
        };
        if let Some((start, end)) = part.split_once('-') {
            let (start, end) = (parse(start)?, parse(end)?);
            if start > end {
                return Err(Error::InvalidData(format!("frame range '{part}' is reversed")));
            }
            frames.extend(start..=end);
        } else {
            frames.insert(parse(part)?);
        }
    }

    Ok(frames)
}

/// Errors that can occur while saving a screenshot.
#[derive(Debug, ThisError)]
pub enum ScreenshotError {
    /// Pixel data did not match the image size.
    #[error("invalid image data: expected {expected} bytes, got {actual}")]
    InvalidImageData { expected: usize, actual: usize },
    /// Failed to encode or write the file.
    #[error("failed to save screenshot to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Save RGBA8 pixel data to an image file.
///
/// The format is chosen from the file extension.
pub fn save_screenshot(
    data: Vec<u8>,
    width: u32,
    height: u32,
    path: impl AsRef<Path>,
) -> std::result::Result<(), ScreenshotError> {
    let path = path.as_ref();
    let expected = width as usize * height as usize * 4;
    let actual = data.len();

    let image = ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, data)
        .ok_or(ScreenshotError::InvalidImageData { expected, actual })?;

    image.save(path).map_err(|source| ScreenshotError::SaveFailed {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Screenshot saved: {}", path.display());
    Ok(())
}

/// Save a rendered frame.
pub fn save_frame(frame: &Frame, path: impl AsRef<Path>) -> std::result::Result<(), ScreenshotError> {
    save_screenshot(frame.pixels.clone(), frame.width, frame.height, path)
}
