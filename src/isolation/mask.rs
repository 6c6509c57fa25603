use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::map::map_subpixels;
use imageproc::morphology::erode;

use crate::models::{BoundingBox, Contour};

/// Fill the interior of `contour` at full intensity on a copy of the edge map
pub fn fill_contour(edges: &GrayImage, contour: &Contour) -> GrayImage {
    let mut filled = edges.clone();
    let white = Luma([255u8]);

    let mut points = contour.points.as_slice();
    // Polygon drawing rejects a closing point that repeats the first one
    while points.len() > 1 && points[0] == points[points.len() - 1] {
        points = &points[..points.len() - 1];
    }

    if points.len() < 3 {
        for p in points {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < filled.width() && (p.y as u32) < filled.height() {
                filled.put_pixel(p.x as u32, p.y as u32, white);
            }
        }
        return filled;
    }

    draw_polygon_mut(&mut filled, points, white);
    filled
}

/// Binarize: pixels at or above `threshold` become 255, everything else 0
pub fn threshold_mask(img: &GrayImage, threshold: u8) -> GrayImage {
    map_subpixels(img, |p: u8| if p >= threshold { 255u8 } else { 0u8 })
}

/// Erode with a `kernel_size` x `kernel_size` square, `iterations` times
pub fn erode_mask(mask: &GrayImage, kernel_size: u8, iterations: u32) -> GrayImage {
    let radius = kernel_size / 2;
    let mut eroded = mask.clone();
    for _ in 0..iterations {
        eroded = erode(&eroded, Norm::LInf, radius);
    }
    eroded
}

/// Keep colour pixels where the mask is on, black out the rest
pub fn apply_mask(img: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        if mask.get_pixel(x, y)[0] > 0 {
            *img.get_pixel(x, y)
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Minimal rectangle around all non-zero mask pixels
pub fn bounding_rect(mask: &GrayImage) -> Option<BoundingBox> {
    let mut min_x = mask.width();
    let mut min_y = mask.height();
    let mut max_x = 0;
    let mut max_y = 0;
    let mut has_content = false;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] > 0 {
            has_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !has_content {
        return None;
    }

    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Expand `bbox` by `margin` on every side, clamped to the image.
/// Returns the rectangle actually used and whether any side was clamped.
pub fn clamp_with_margin(bbox: BoundingBox, margin: u32, width: u32, height: u32) -> (BoundingBox, bool) {
    let x0 = bbox.x.saturating_sub(margin);
    let y0 = bbox.y.saturating_sub(margin);
    let x1 = bbox.right().saturating_add(margin).min(width);
    let y1 = bbox.bottom().saturating_add(margin).min(height);

    let clamped = bbox.x < margin
        || bbox.y < margin
        || bbox.right().saturating_add(margin) > width
        || bbox.bottom().saturating_add(margin) > height;

    let rect = BoundingBox {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    };

    (rect, clamped)
}

/// Crop `img` to `bbox` grown by `margin`, see [`clamp_with_margin`]
pub fn crop_with_margin(img: &RgbImage, bbox: BoundingBox, margin: u32) -> (RgbImage, BoundingBox, bool) {
    let (rect, clamped) = clamp_with_margin(bbox, margin, img.width(), img.height());
    let cropped = image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image();
    (cropped, rect, clamped)
}
