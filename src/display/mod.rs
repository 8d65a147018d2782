#[cfg(feature = "gui")]
pub mod window;

#[cfg(feature = "gui")]
pub use window::WindowDisplay;

use std::time::Duration;
use tracing::trace;

use crate::config::DisplayConfig;
use crate::models::Frame;

/// Window showing the chain output
pub const PROCESSED_WINDOW: &str = "Processed";
/// Window showing the captured frame
pub const ORIGINAL_WINDOW: &str = "Original";

/// User input observed while polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A key was pressed; letters are lowercase
    Key(char),
    /// The user closed one of the windows
    WindowClosed,
}

/// Output surfaces plus keyboard input
pub trait FrameDisplay {
    /// Show `frame` on the surface called `name`, creating it on first use
    fn show(&mut self, name: &str, frame: &Frame) -> anyhow::Result<()>;

    /// Wait up to `timeout` for a single key press
    fn poll_key(&mut self, timeout: Duration) -> Option<KeyInput>;

    /// Close every surface
    fn destroy_all(&mut self);
}

/// Display that shows nothing and never reports a key
#[derive(Debug, Default)]
pub struct HeadlessDisplay;

impl FrameDisplay for HeadlessDisplay {
    fn show(&mut self, name: &str, frame: &Frame) -> anyhow::Result<()> {
        trace!(window = name, width = frame.width(), height = frame.height(), "headless frame");
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Option<KeyInput> {
        None
    }

    fn destroy_all(&mut self) {}
}

/// Pick the display backend for the given configuration
pub fn for_config(config: &DisplayConfig) -> Box<dyn FrameDisplay> {
    if config.headless {
        return Box::new(HeadlessDisplay::default());
    }

    #[cfg(feature = "gui")]
    {
        Box::new(WindowDisplay::new())
    }

    #[cfg(not(feature = "gui"))]
    {
        tracing::warn!("built without window support, running headless");
        Box::new(HeadlessDisplay::default())
    }
}
