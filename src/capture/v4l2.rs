use image::ImageFormat;
use tracing::{info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use super::{convert, CaptureBackend, CaptureDevice, CaptureError};
use crate::models::Frame;

/// V4L2 webcam backend. Device id N opens `/dev/videoN`.
pub struct V4l2Backend {
    buffer_count: u32,
}

impl Default for V4l2Backend {
    fn default() -> Self {
        Self { buffer_count: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Mjpeg,
    Yuyv,
}

impl CaptureBackend for V4l2Backend {
    /// Opens the device, asks for MJPEG at the requested resolution and
    /// accepts YUYV if the driver falls back to it.
    fn open(&self, device_id: u32, width: u32, height: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        let path = format!("/dev/video{}", device_id);
        let open_error = |reason: String| CaptureError::Open {
            device: path.clone(),
            reason,
        };

        let device = Device::with_path(&path).map_err(|e| open_error(e.to_string()))?;

        let requested = Format::new(width, height, FourCC::new(b"MJPG"));
        let format = Capture::set_format(&device, &requested).map_err(|e| open_error(e.to_string()))?;

        let encoding = if format.fourcc == FourCC::new(b"MJPG") {
            Encoding::Mjpeg
        } else if format.fourcc == FourCC::new(b"YUYV") {
            Encoding::Yuyv
        } else {
            return Err(open_error(format!("unsupported pixel format {:?}", format.fourcc)));
        };

        if (format.width, format.height) != (width, height) {
            warn!(
                requested_width = width,
                requested_height = height,
                width = format.width,
                height = format.height,
                "camera did not accept requested resolution"
            );
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, self.buffer_count)
            .map_err(|e| open_error(e.to_string()))?;

        info!(device = %path, width = format.width, height = format.height, ?encoding, "camera opened");

        Ok(Box::new(V4l2Capture {
            stream: Some(stream),
            encoding,
            width: format.width,
            height: format.height,
        }))
    }

    fn name(&self) -> &str {
        "v4l2"
    }
}

pub struct V4l2Capture {
    stream: Option<MmapStream<'static>>,
    encoding: Encoding,
    width: u32,
    height: u32,
}

impl CaptureDevice for V4l2Capture {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CaptureError::Read("device released".to_string()))?;

        // The buffer is only valid until the next call, decode it right away
        let (data, _metadata) = CaptureStream::next(stream).map_err(|e| CaptureError::Read(e.to_string()))?;

        match self.encoding {
            Encoding::Mjpeg => Ok(image::load_from_memory_with_format(data, ImageFormat::Jpeg)?.to_rgb8()),
            Encoding::Yuyv => convert::yuyv_to_frame(data, self.width, self.height)
                .ok_or_else(|| CaptureError::Read("short YUYV buffer".to_string())),
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        self.stream = None;
    }
}
