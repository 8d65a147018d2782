use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use visionpipe::capture::{self, CaptureBackend, ImageSequenceBackend};
use visionpipe::{display, Outcome, PipelineConfig, PipelineSession};

#[derive(Parser)]
#[command(name = "visionpipe")]
#[command(about = "Real-time webcam filter pipeline")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Camera device number
    #[arg(long)]
    device: Option<u32>,

    /// Requested frame width
    #[arg(long)]
    width: Option<u32>,

    /// Requested frame height
    #[arg(long)]
    height: Option<u32>,

    /// Replay the images in this directory instead of using the camera
    #[arg(long, value_name = "DIR")]
    replay: Option<PathBuf>,

    /// Run without windows
    #[arg(long)]
    headless: bool,

    /// Directory saved frames are written to
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Let command-line flags override the configuration file
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(device) = self.device {
            config.camera.device = device;
        }
        if let Some(width) = self.width {
            config.camera.width = width;
        }
        if let Some(height) = self.height {
            config.camera.height = height;
        }
        if let Some(dir) = &self.replay {
            config.camera.replay_dir = Some(dir.clone());
        }
        if self.headless {
            config.display.headless = true;
        }
        if let Some(dir) = &self.output {
            config.output.dir = dir.clone();
        }
        if self.verbose {
            config.logging.level = "debug".into();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let backend: Box<dyn CaptureBackend> = match &config.camera.replay_dir {
        Some(dir) => Box::new(ImageSequenceBackend::new(dir).with_resize(true)),
        None => capture::camera_backend(),
    };
    let display = display::for_config(&config.display);

    let mut session = PipelineSession::new(config, backend, display);
    let summary = session.run();

    if summary.outcome != Outcome::CameraUnavailable {
        info!(outcome = ?summary.outcome, frames = summary.frames, "session finished");
    }

    Ok(())
}
