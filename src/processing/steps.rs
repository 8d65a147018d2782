use crate::models::{BoundingBox, Frame};
use crate::processing::{contours, primitives, FrameProcessor};
use anyhow::Result;
use image::{GrayImage, Rgb};
use tracing::{debug, trace};

/// Smoothing kernel applied to every frame before differencing
pub const MOTION_BLUR_KERNEL: u32 = 21;

/// Contours must enclose more than this many pixels to count as motion
pub const MOTION_MIN_AREA: f64 = 500.0;

/// Outline color of motion rectangles
pub const MOTION_HIGHLIGHT: Rgb<u8> = Rgb([0, 255, 0]);

const MOTION_OUTLINE_THICKNESS: u32 = 2;

/// Apply Gaussian blur
pub struct BlurProcessor {
    /// Odd kernel size
    pub kernel_size: u32,
}

impl Default for BlurProcessor {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

impl FrameProcessor for BlurProcessor {
    fn process(&mut self, frame: Frame) -> Result<Frame> {
        Ok(primitives::blur_frame(&frame, self.kernel_size))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny, returned as a 3-channel frame
pub struct EdgeDetectionProcessor {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeDetectionProcessor {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

impl FrameProcessor for EdgeDetectionProcessor {
    fn process(&mut self, frame: Frame) -> Result<Frame> {
        let gray = primitives::to_grayscale(&frame);
        let edges = primitives::detect_edges(&gray, self.low_threshold, self.high_threshold);
        Ok(primitives::gray_to_frame(edges))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Frame-differencing motion detector.
///
/// Keeps the smoothed grayscale version of the last frame it saw and
/// outlines every sufficiently large region that changed since then.
/// The very first frame only seeds the reference and passes through
/// untouched.
pub struct MotionDetectionProcessor {
    /// Minimum per-pixel intensity change counted as motion
    pub threshold: u8,
    previous: Option<GrayImage>,
    regions: Vec<BoundingBox>,
}

impl MotionDetectionProcessor {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            previous: None,
            regions: Vec::new(),
        }
    }

    /// Whether a reference frame is stored
    pub fn has_reference(&self) -> bool {
        self.previous.is_some()
    }

    /// Rectangles outlined by the most recent call to `process`
    pub fn regions(&self) -> &[BoundingBox] {
        &self.regions
    }

    /// Forget the reference frame; the next call is a cold start again
    pub fn reset(&mut self) {
        self.previous = None;
        self.regions.clear();
    }

    fn changed_regions(&self, previous: &GrayImage, current: &GrayImage) -> Vec<BoundingBox> {
        let diff = primitives::absolute_difference(previous, current);
        let mask = primitives::binary_threshold(&diff, self.threshold);
        let found = contours::find_external_contours(&mask);
        let moving = contours::filter_by_area(&found, MOTION_MIN_AREA);

        trace!(contours = found.len(), moving = moving.len(), "motion contours");

        moving.iter().map(|c| c.bounding_box()).collect()
    }
}

impl Default for MotionDetectionProcessor {
    fn default() -> Self {
        Self::new(25)
    }
}

impl FrameProcessor for MotionDetectionProcessor {
    fn process(&mut self, frame: Frame) -> Result<Frame> {
        let gray = primitives::to_grayscale(&frame);
        let gray = primitives::blur_gray(&gray, MOTION_BLUR_KERNEL);

        let previous = match self.previous.take() {
            Some(previous) if previous.dimensions() == gray.dimensions() => previous,
            stale => {
                if stale.is_some() {
                    debug!(
                        width = gray.width(),
                        height = gray.height(),
                        "frame size changed, reseeding motion reference"
                    );
                }
                self.previous = Some(gray);
                self.regions.clear();
                return Ok(frame);
            }
        };

        self.regions = self.changed_regions(&previous, &gray);
        self.previous = Some(gray);

        let mut result = frame;
        for bbox in &self.regions {
            primitives::draw_rect_outline(&mut result, *bbox, MOTION_HIGHLIGHT, MOTION_OUTLINE_THICKNESS);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Motion Detection"
    }
}
