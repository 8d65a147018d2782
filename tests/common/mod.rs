#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from visionpipe for tests
pub use visionpipe::display::{KeyInput, ORIGINAL_WINDOW, PROCESSED_WINDOW};
pub use visionpipe::processing::{BlurProcessor, EdgeDetectionProcessor, MotionDetectionProcessor};
pub use visionpipe::{Frame, FrameProcessor, Outcome, PipelineSession, ProcessorChain, SessionState, Toggle};
