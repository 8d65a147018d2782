use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::capture::{CaptureBackend, CaptureDevice, CaptureError};
use crate::config::PipelineConfig;
use crate::display::{FrameDisplay, KeyInput, ORIGINAL_WINDOW, PROCESSED_WINDOW};
use crate::fps::FpsCounter;
use crate::keys::{self, Command};
use crate::models::Frame;
use crate::overlay::Overlay;
use crate::pipeline::{ProcessorChain, ProcessorId};
use crate::processing::{BlurProcessor, EdgeDetectionProcessor, MotionDetectionProcessor};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Running,
    Stopped,
}

/// Whether the loop continues after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The camera could not be opened; the loop never started
    CameraUnavailable,
    /// The user asked to quit
    Quit,
    /// The capture source ran out of frames
    EndOfStream,
    /// Capturing or presenting a frame failed
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub frames: u64,
}

/// The long-lived processor instances the toggle keys act on
#[derive(Debug, Clone, Copy)]
pub struct ToggleHandles {
    pub edges: ProcessorId,
    pub blur: ProcessorId,
    pub motion: ProcessorId,
}

/// Capture → process → display loop.
///
/// Owns the capture device for its whole lifetime. `run` drives the full
/// lifecycle; `init` and `step` expose the individual phases.
pub struct PipelineSession {
    config: PipelineConfig,
    backend: Box<dyn CaptureBackend>,
    display: Box<dyn FrameDisplay>,
    capture: Option<Box<dyn CaptureDevice>>,
    chain: ProcessorChain,
    handles: ToggleHandles,
    overlay: Overlay,
    fps: FpsCounter,
    frame_count: u64,
    state: SessionState,
}

impl PipelineSession {
    pub fn new(config: PipelineConfig, backend: Box<dyn CaptureBackend>, display: Box<dyn FrameDisplay>) -> Self {
        let mut chain = ProcessorChain::new();
        let params = &config.processors;
        let handles = ToggleHandles {
            edges: chain.register(Box::new(EdgeDetectionProcessor {
                low_threshold: params.edge_low,
                high_threshold: params.edge_high,
            })),
            blur: chain.register(Box::new(BlurProcessor {
                kernel_size: params.blur_kernel,
            })),
            motion: chain.register(Box::new(MotionDetectionProcessor::new(params.motion_threshold))),
        };

        let overlay = if config.display.overlay {
            Overlay::load(config.display.font_path.as_deref())
        } else {
            Overlay::disabled()
        };

        Self {
            config,
            backend,
            display,
            capture: None,
            chain,
            handles,
            overlay,
            fps: FpsCounter::new(),
            frame_count: 0,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn chain(&self) -> &ProcessorChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut ProcessorChain {
        &mut self.chain
    }

    pub fn handles(&self) -> ToggleHandles {
        self.handles
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Frame size of the open capture device
    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.capture.as_ref().map(|c| c.resolution())
    }

    /// Open the configured camera. On failure the session stays
    /// uninitialized and the error is returned.
    pub fn init(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Uninitialized {
            warn!(state = ?self.state, "session already initialized");
            return Ok(());
        }

        let camera = &self.config.camera;
        match self.backend.open(camera.device, camera.width, camera.height) {
            Ok(capture) => {
                let (width, height) = capture.resolution();
                info!(
                    backend = self.backend.name(),
                    device = camera.device,
                    width,
                    height,
                    "camera initialized"
                );
                self.capture = Some(capture);
                self.fps = FpsCounter::new();
                self.state = SessionState::Running;
                Ok(())
            }
            Err(e) => {
                error!(backend = self.backend.name(), device = camera.device, error = %e, "cannot open camera");
                Err(e)
            }
        }
    }

    /// One loop iteration: capture, process, overlay, show, handle one key
    pub fn step(&mut self) -> Result<Flow> {
        let capture = self
            .capture
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("session is not running"))?;

        let frame = capture.read_frame()?;
        let mut processed = self.chain.apply(&frame)?;

        let fps = self.fps.update();
        self.frame_count += 1;

        self.overlay.draw(&mut processed, fps, self.chain.len(), self.frame_count);

        self.display.show(PROCESSED_WINDOW, &processed)?;
        self.display.show(ORIGINAL_WINDOW, &frame)?;

        let timeout = Duration::from_millis(self.config.display.key_poll_ms);
        let flow = match self.display.poll_key(timeout) {
            None => Flow::Continue,
            Some(KeyInput::WindowClosed) => {
                info!("window closed");
                Flow::Quit
            }
            Some(KeyInput::Key(key)) => match Command::from_key(key) {
                Some(command) => self.dispatch(command, &processed),
                None => {
                    debug!(?key, "unbound key");
                    Flow::Continue
                }
            },
        };

        Ok(flow)
    }

    /// Apply a user command
    pub fn dispatch(&mut self, command: Command, processed: &Frame) -> Flow {
        debug!(?command, "dispatching command");
        match command {
            Command::Quit => return Flow::Quit,
            Command::Save => {
                if let Err(e) = self.save_frame(processed) {
                    error!(error = %e, "failed to save frame");
                }
            }
            Command::Clear => self.chain.clear(),
            Command::ToggleEdges => self.toggle(self.handles.edges),
            Command::ToggleBlur => self.toggle(self.handles.blur),
            Command::ToggleMotion => self.toggle(self.handles.motion),
        }
        Flow::Continue
    }

    fn toggle(&mut self, id: ProcessorId) {
        let toggle = self.chain.toggle(id);
        if let Some(processor) = self.chain.processor(id) {
            debug!(processor = processor.name(), ?toggle, active = self.chain.len(), "toggled processor");
        }
    }

    /// File the current frame is saved to
    pub fn save_path(&self) -> PathBuf {
        let output = &self.config.output;
        output.dir.join(format!("frame_{}.{}", self.frame_count, output.format))
    }

    /// Write `frame` to the output directory, creating it if needed
    pub fn save_frame(&self, frame: &Frame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.output.dir)
            .with_context(|| format!("Failed to create {}", self.config.output.dir.display()))?;

        let path = self.save_path();
        frame
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;

        info!(path = %path.display(), "saved frame");
        Ok(path)
    }

    /// Initialize, loop until quit or capture failure, then clean up
    pub fn run(&mut self) -> RunSummary {
        if self.init().is_err() {
            return RunSummary {
                outcome: Outcome::CameraUnavailable,
                frames: self.frame_count,
            };
        }

        println!("\n=== Vision Pipeline Started ===");
        print!("{}", keys::controls_help());
        println!("================================\n");

        let outcome = loop {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break Outcome::Quit,
                Err(e) => match e.downcast_ref::<CaptureError>() {
                    Some(CaptureError::EndOfStream) => {
                        info!("capture stream ended");
                        break Outcome::EndOfStream;
                    }
                    Some(_) => {
                        error!(error = %e, "failed to capture frame");
                        break Outcome::Failed;
                    }
                    None => {
                        error!(error = %e, "pipeline iteration failed");
                        break Outcome::Failed;
                    }
                },
            }
        };

        self.cleanup();

        RunSummary {
            outcome,
            frames: self.frame_count,
        }
    }

    /// Release the camera and close all windows. Runs once, on leaving
    /// the running state; later calls do nothing.
    pub fn cleanup(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        if self.config.session.add_motion_on_exit {
            self.chain.add(self.handles.motion);
        }

        if let Some(mut capture) = self.capture.take() {
            capture.release();
        }
        self.display.destroy_all();
        self.state = SessionState::Stopped;

        info!(frames = self.frame_count, "pipeline stopped");
        println!("\n=== Pipeline Stopped ===");
        println!("Total frames processed: {}", self.frame_count);
    }
}

impl Drop for PipelineSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}
