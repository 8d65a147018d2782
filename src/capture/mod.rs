//! Frame sources for the pipeline.
//!
//! A `CaptureBackend` opens a device by id; the resulting `CaptureDevice`
//! is owned by the session and read synchronously on the loop thread.

pub mod convert;
pub mod sequence;

#[cfg(all(feature = "v4l2", target_os = "linux"))]
pub mod v4l2;

pub use sequence::ImageSequenceBackend;

#[cfg(all(feature = "v4l2", target_os = "linux"))]
pub use v4l2::V4l2Backend;

use crate::models::Frame;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("cannot open capture device {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("failed to read frame: {0}")]
    Read(String),
    #[error("end of stream")]
    EndOfStream,
    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
    #[error("{0} capture is not available in this build")]
    Unsupported(&'static str),
}

/// An open frame source
pub trait CaptureDevice {
    /// Block until the next frame is available
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Frame size the device delivers, which may differ from the one
    /// requested at open time
    fn resolution(&self) -> (u32, u32);

    /// Release the underlying device. Reads after release fail.
    fn release(&mut self);
}

/// Opens capture devices
pub trait CaptureBackend {
    /// Open device `device_id`, requesting `width`x`height`.
    /// The resolution is a request; devices may pick another one.
    fn open(&self, device_id: u32, width: u32, height: u32) -> Result<Box<dyn CaptureDevice>, CaptureError>;

    /// Backend name for log output
    fn name(&self) -> &str;
}

/// The webcam backend compiled into this build
#[cfg(all(feature = "v4l2", target_os = "linux"))]
pub fn camera_backend() -> Box<dyn CaptureBackend> {
    Box::new(V4l2Backend::default())
}

/// The webcam backend compiled into this build
#[cfg(not(all(feature = "v4l2", target_os = "linux")))]
pub fn camera_backend() -> Box<dyn CaptureBackend> {
    Box::new(UnavailableBackend)
}

/// Stand-in when no webcam support is compiled in; every open fails
#[cfg(not(all(feature = "v4l2", target_os = "linux")))]
pub struct UnavailableBackend;

#[cfg(not(all(feature = "v4l2", target_os = "linux")))]
impl CaptureBackend for UnavailableBackend {
    fn open(&self, _device_id: u32, _width: u32, _height: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Err(CaptureError::Unsupported("webcam"))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
