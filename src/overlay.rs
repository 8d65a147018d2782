use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use imageproc::drawing::draw_text_mut;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Frame;

/// Fonts tried when no font path is configured
pub const FALLBACK_FONTS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const TEXT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LEFT_MARGIN: i32 = 10;

/// (baseline y, pixel height) for each overlay line
const LINE_LAYOUT: [(i32, f32); 3] = [(30, 24.0), (60, 18.0), (90, 18.0)];

/// Diagnostic text drawn on the processed frame
pub struct Overlay {
    font: Option<FontVec>,
    warned: bool,
}

impl Overlay {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font, warned: false }
    }

    /// Overlay that never draws anything
    pub fn disabled() -> Self {
        Self {
            font: None,
            warned: true,
        }
    }

    /// Load the font at `path`, or the first fallback font found on this
    /// system. A missing font leaves the overlay without text.
    pub fn load(path: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match path {
            Some(p) => vec![p.to_path_buf()],
            None => FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
        };

        for candidate in &candidates {
            match load_font(candidate) {
                Ok(font) => {
                    debug!(font = %candidate.display(), "loaded overlay font");
                    return Self::new(Some(font));
                }
                Err(e) if path.is_some() => {
                    warn!(font = %candidate.display(), error = %e, "cannot load overlay font");
                }
                Err(_) => {}
            }
        }

        Self::new(None)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Text of the three overlay lines
    pub fn lines(fps: f64, processors: usize, frames: u64) -> [String; 3] {
        [
            format!("FPS: {:.1}", fps),
            format!("Processors: {}", processors),
            format!("Frame: {}", frames),
        ]
    }

    /// Draw the overlay in the top-left corner of `frame`
    pub fn draw(&mut self, frame: &mut Frame, fps: f64, processors: usize, frames: u64) {
        let Some(font) = &self.font else {
            if !self.warned {
                warn!("no overlay font available, diagnostic text disabled");
                self.warned = true;
            }
            return;
        };

        for (text, (baseline, size)) in Self::lines(fps, processors, frames).iter().zip(LINE_LAYOUT) {
            let top = baseline - size as i32;
            draw_text_mut(frame, TEXT_COLOR, LEFT_MARGIN, top, PxScale::from(size), font, text);
        }
    }
}

fn load_font(path: &Path) -> anyhow::Result<FontVec> {
    let bytes = std::fs::read(path)?;
    FontVec::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("Invalid font file: {}", e))
}
