pub mod primitives;
pub mod contours;
pub mod steps;

use anyhow::Result;
use crate::models::Frame;

pub use steps::{BlurProcessor, EdgeDetectionProcessor, MotionDetectionProcessor};

/// A single stage of the frame chain.
///
/// Each processor consumes the previous stage's output and returns the
/// frame handed to the next stage. Stateful processors keep their state
/// between calls, so `process` takes `&mut self`.
pub trait FrameProcessor: Send {
    /// Transform one frame
    fn process(&mut self, frame: Frame) -> Result<Frame>;

    /// Human-readable name for this processor (used in log output)
    fn name(&self) -> &str;
}
