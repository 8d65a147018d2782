pub mod capture;
pub mod config;
pub mod display;
pub mod fps;
pub mod keys;
pub mod models;
pub mod overlay;
pub mod pipeline;
pub mod processing;
pub mod session;

pub use models::{BoundingBox, Contour, Frame};
pub use processing::FrameProcessor;
pub use pipeline::{ProcessorChain, ProcessorId, Toggle};
pub use session::{Flow, Outcome, PipelineSession, RunSummary, SessionState};
pub use config::PipelineConfig;
