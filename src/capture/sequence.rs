use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{CaptureBackend, CaptureDevice, CaptureError};
use crate::models::Frame;

/// Replays the image files of a directory, in file-name order, as a
/// capture device. Useful without a webcam and for reproducible runs.
///
/// The device id is ignored. Frames are delivered at their stored size;
/// when `resize` is set they are scaled to the requested resolution.
pub struct ImageSequenceBackend {
    dir: PathBuf,
    resize: bool,
}

impl ImageSequenceBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            resize: false,
        }
    }

    /// Scale every frame to the requested resolution
    pub fn with_resize(mut self, resize: bool) -> Self {
        self.resize = resize;
        self
    }

    /// Image files in `dir`, sorted by name
    pub fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && image::ImageFormat::from_path(path).is_ok())
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CaptureBackend for ImageSequenceBackend {
    fn open(&self, _device_id: u32, width: u32, height: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        let open_error = |reason: String| CaptureError::Open {
            device: self.dir.display().to_string(),
            reason,
        };

        let files = Self::list_frames(&self.dir).map_err(|e| open_error(e.to_string()))?;
        if files.is_empty() {
            return Err(open_error("no image files found".to_string()));
        }

        let target = self.resize.then_some((width, height));
        let resolution = match target {
            Some(size) => size,
            None => image::image_dimensions(&files[0]).map_err(|e| open_error(e.to_string()))?,
        };

        info!(
            dir = %self.dir.display(),
            frames = files.len(),
            width = resolution.0,
            height = resolution.1,
            "replaying image sequence"
        );

        Ok(Box::new(ImageSequenceCapture {
            frames: files.into(),
            target,
            resolution,
            released: false,
        }))
    }

    fn name(&self) -> &str {
        "image-sequence"
    }
}

pub struct ImageSequenceCapture {
    frames: VecDeque<PathBuf>,
    target: Option<(u32, u32)>,
    resolution: (u32, u32),
    released: bool,
}

impl CaptureDevice for ImageSequenceCapture {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.released {
            return Err(CaptureError::Read("device released".to_string()));
        }
        let path = self.frames.pop_front().ok_or(CaptureError::EndOfStream)?;
        debug!(frame = %path.display(), "reading replay frame");

        let img = image::open(&path)?;
        let img = match self.target {
            Some((w, h)) if (img.width(), img.height()) != (w, h) => {
                img.resize_exact(w, h, image::imageops::FilterType::Triangle)
            }
            _ => img,
        };

        let frame = img.to_rgb8();
        self.resolution = frame.dimensions();
        Ok(frame)
    }

    /// Size of the last frame read, or of the first file before any read
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn release(&mut self) {
        self.frames.clear();
        self.released = true;
    }
}
