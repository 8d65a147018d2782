use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use crate::models::Contour;

/// Find the outermost borders of the foreground regions in a binary mask.
///
/// Hole borders and regions nested inside holes are dropped, so every
/// returned contour encloses a top-level connected region. Order follows
/// the raster scan of the underlying tracer.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    // Regions touching column 0 are traced as holes unless the mask has a
    // background border, so trace a copy padded by one pixel
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(|c| {
            let points: Vec<Point<i32>> = c.points.iter().map(|p| Point::new(p.x - 1, p.y - 1)).collect();
            Contour::from_points(&points)
        })
        .collect()
}

/// Keep contours whose enclosed area is strictly greater than `min_area`
pub fn filter_by_area(contours: &[Contour], min_area: f64) -> Vec<Contour> {
    contours
        .iter()
        .filter(|c| c.area > min_area)
        .cloned()
        .collect()
}
