use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Pipeline configuration, read from a TOML file. Every section and field
/// is optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub processors: ProcessorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Replay the images in this directory instead of opening a webcam
    #[serde(default)]
    pub replay_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_blur_kernel")]
    pub blur_kernel: u32,
    #[serde(default = "default_edge_low")]
    pub edge_low: f32,
    #[serde(default = "default_edge_high")]
    pub edge_high: f32,
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_key_poll_ms")]
    pub key_poll_ms: u64,
    #[serde(default = "default_overlay")]
    pub overlay: bool,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Put the motion detector back into the chain right before shutdown,
    /// whatever its state. Off unless exact legacy behavior is wanted.
    #[serde(default)]
    pub add_motion_on_exit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: default_width(),
            height: default_height(),
            replay_dir: None,
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            blur_kernel: default_blur_kernel(),
            edge_low: default_edge_low(),
            edge_high: default_edge_high(),
            motion_threshold: default_motion_threshold(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            headless: false,
            key_poll_ms: default_key_poll_ms(),
            overlay: default_overlay(),
            font_path: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: default_output_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "camera resolution must be non-zero, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }
        let kernel = self.processors.blur_kernel;
        if kernel == 0 || kernel % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "blur kernel size must be a positive odd number, got {}",
                kernel
            )));
        }
        if self.processors.edge_low > self.processors.edge_high {
            return Err(ConfigError::Invalid(format!(
                "edge thresholds out of order: low {} > high {}",
                self.processors.edge_low, self.processors.edge_high
            )));
        }
        if image::ImageFormat::from_extension(&self.output.format).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown output image format '{}'",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    480
}
fn default_blur_kernel() -> u32 {
    5
}
fn default_edge_low() -> f32 {
    50.0
}
fn default_edge_high() -> f32 {
    150.0
}
fn default_motion_threshold() -> u8 {
    25
}
fn default_key_poll_ms() -> u64 {
    10
}
fn default_overlay() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_output_format() -> String {
    "png".into()
}
fn default_log_level() -> String {
    "info".into()
}
