use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, Rgb32FImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::rect::Rect;

use crate::models::{BoundingBox, Frame};

/// Sigma of a square Gaussian kernel of the given (odd) size, derived the
/// way vision libraries do when only a kernel size is requested
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Convert a color frame to single-channel intensity
pub fn to_grayscale(frame: &Frame) -> GrayImage {
    image::imageops::grayscale(frame)
}

/// Expand a single-channel image back to three equal channels
pub fn gray_to_frame(gray: GrayImage) -> Frame {
    DynamicImage::ImageLuma8(gray).to_rgb8()
}

/// Normalized 1-D Gaussian with exactly `kernel_size` taps
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = sigma_for_kernel(kernel_size);
    let radius = (kernel_size / 2) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian blur of a color frame. A kernel of size 1 leaves the frame as is.
///
/// Filtering runs on f32 channels and is rounded once at the end, so flat
/// areas keep their exact value.
pub fn blur_frame(frame: &Frame, kernel_size: u32) -> Frame {
    if kernel_size <= 1 {
        return frame.clone();
    }
    let wide = Rgb32FImage::from_fn(frame.width(), frame.height(), |x, y| Rgb(frame.get_pixel(x, y).0.map(f32::from)));
    let blurred = separable_filter_equal(&wide, &gaussian_kernel(kernel_size));
    Frame::from_fn(frame.width(), frame.height(), |x, y| Rgb(blurred.get_pixel(x, y).0.map(to_channel)))
}

/// Gaussian blur of a grayscale image
pub fn blur_gray(img: &GrayImage, kernel_size: u32) -> GrayImage {
    if kernel_size <= 1 {
        return img.clone();
    }
    let wide: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(img.width(), img.height(), |x, y| Luma([f32::from(img.get_pixel(x, y)[0])]));
    let blurred = separable_filter_equal(&wide, &gaussian_kernel(kernel_size));
    GrayImage::from_fn(img.width(), img.height(), |x, y| Luma([to_channel(blurred.get_pixel(x, y)[0])]))
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Detect edges using the Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Per-pixel absolute difference of two equally sized grayscale images
pub fn absolute_difference(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].abs_diff(b.get_pixel(x, y)[0])])
    })
}

/// Binarize: pixels at or above `threshold` become 255, the rest 0
pub fn binary_threshold(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = img.clone();
    for pixel in mask.pixels_mut() {
        pixel[0] = if pixel[0] >= threshold { 255 } else { 0 };
    }
    mask
}

/// Draw a rectangle outline `thickness` pixels wide.
///
/// The outer edge of the outline is `bbox` itself and extra thickness grows
/// inwards, so the outline never leaves the box or the frame.
pub fn draw_rect_outline(frame: &mut Frame, bbox: BoundingBox, color: Rgb<u8>, thickness: u32) {
    for i in 0..thickness {
        let inset_w = bbox.width.saturating_sub(2 * i);
        let inset_h = bbox.height.saturating_sub(2 * i);
        if inset_w == 0 || inset_h == 0 {
            break;
        }
        let rect = Rect::at((bbox.x + i) as i32, (bbox.y + i) as i32).of_size(inset_w, inset_h);
        draw_hollow_rect_mut(frame, rect, color);
    }
}
