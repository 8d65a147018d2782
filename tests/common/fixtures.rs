use image::{ImageBuffer, Rgb};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use visionpipe::capture::{CaptureBackend, CaptureDevice, CaptureError};
use visionpipe::display::{FrameDisplay, KeyInput};
use visionpipe::{Frame, PipelineConfig};

/// Frame filled with a single color
pub fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Frame {
    ImageBuffer::from_pixel(width, height, Rgb(color))
}

/// Black frame with a white square whose top-left corner is at (x, y)
pub fn frame_with_square(width: u32, height: u32, x: u32, y: u32, size: u32) -> Frame {
    ImageBuffer::from_fn(width, height, |px, py| {
        if px >= x && px < x + size && py >= y && py < y + size {
            Rgb([255u8, 255u8, 255u8])
        } else {
            Rgb([0u8, 0u8, 0u8])
        }
    })
}

/// Gradient frame; `seed` shifts the colors so frames differ
pub fn gradient_frame(width: u32, height: u32, seed: u8) -> Frame {
    ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        Rgb([r.wrapping_add(seed), g, seed])
    })
}

/// Count pixels with exactly the given color
pub fn count_color(frame: &Frame, color: [u8; 3]) -> usize {
    frame.pixels().filter(|p| p.0 == color).count()
}

/// Shared record of what a scripted capture device did
#[derive(Debug, Default)]
pub struct CaptureLog {
    pub opened: u32,
    pub reads: u32,
    pub released: u32,
}

/// Backend handing out a fixed list of frames, then end of stream
pub struct ScriptedBackend {
    frames: Vec<Frame>,
    fail_open: bool,
    failure: Option<usize>,
    pub log: Rc<RefCell<CaptureLog>>,
}

impl ScriptedBackend {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            fail_open: false,
            failure: None,
            log: Rc::new(RefCell::new(CaptureLog::default())),
        }
    }

    /// Backend whose camera never opens
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new())
        }
    }

    /// Read number `index` (0-based) fails with a read error
    pub fn failing_at(mut self, index: usize) -> Self {
        self.failure = Some(index);
        self
    }
}

impl CaptureBackend for ScriptedBackend {
    fn open(&self, device_id: u32, width: u32, height: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        if self.fail_open {
            return Err(CaptureError::Open {
                device: format!("scripted{}", device_id),
                reason: "no such device".to_string(),
            });
        }
        self.log.borrow_mut().opened += 1;
        Ok(Box::new(ScriptedCapture {
            resolution: self.frames.first().map_or((width, height), |f| f.dimensions()),
            frames: self.frames.clone().into(),
            failure: self.failure,
            read: 0,
            log: self.log.clone(),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedCapture {
    resolution: (u32, u32),
    frames: VecDeque<Frame>,
    failure: Option<usize>,
    read: usize,
    log: Rc<RefCell<CaptureLog>>,
}

impl CaptureDevice for ScriptedCapture {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        self.log.borrow_mut().reads += 1;
        let index = self.read;
        self.read += 1;
        if self.failure == Some(index) {
            return Err(CaptureError::Read("scripted failure".to_string()));
        }
        self.frames.pop_front().ok_or(CaptureError::EndOfStream)
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn release(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

/// Shared record of what a recording display saw
#[derive(Debug, Default)]
pub struct DisplayLog {
    pub shown: Vec<(String, Frame)>,
    pub destroyed: u32,
    /// Inputs returned by successive polls; `None` entries mean no key
    pub inputs: VecDeque<Option<KeyInput>>,
}

impl DisplayLog {
    pub fn frames_for(&self, window: &str) -> Vec<Frame> {
        self.shown
            .iter()
            .filter(|(name, _)| name == window)
            .map(|(_, frame)| frame.clone())
            .collect()
    }
}

/// Display that records every frame and replays scripted key presses
pub struct RecordingDisplay {
    pub log: Rc<RefCell<DisplayLog>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(DisplayLog::default())),
        }
    }

    /// Queue the inputs for successive polls
    pub fn with_inputs(self, inputs: Vec<Option<KeyInput>>) -> Self {
        self.log.borrow_mut().inputs = inputs.into();
        self
    }
}

impl FrameDisplay for RecordingDisplay {
    fn show(&mut self, name: &str, frame: &Frame) -> anyhow::Result<()> {
        self.log.borrow_mut().shown.push((name.to_string(), frame.clone()));
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Option<KeyInput> {
        self.log.borrow_mut().inputs.pop_front().flatten()
    }

    fn destroy_all(&mut self) {
        self.log.borrow_mut().destroyed += 1;
    }
}

/// Configuration for tests: no overlay text, no key wait, output under `dir`
pub fn test_config(output_dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.display.overlay = false;
    config.display.headless = true;
    config.display.key_poll_ms = 0;
    config.output.dir = output_dir.to_path_buf();
    config
}

/// TrueType font shipped with the tests
pub fn test_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSans.ttf")
}

/// Shorthand for a key press input
pub fn key(c: char) -> Option<KeyInput> {
    Some(KeyInput::Key(c))
}
