use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;
use std::path::Path;

use crate::config::ResizeStrategy;
use crate::error::Result;
use crate::isolation::edges::canny_edges;

/// Read and decode a photo from disk, sniffing the format from its content
pub fn load_photo<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img)
}

/// Bring a photo to the working resolution as 8-bit RGB.
/// A photo already at the target size is returned unchanged.
pub fn normalize_scale(img: &DynamicImage, strategy: ResizeStrategy) -> RgbImage {
    let rgb = img.to_rgb8();
    let (width, height) = strategy.target_dimensions(rgb.width(), rgb.height());
    if (width, height) == rgb.dimensions() {
        return rgb;
    }
    image::imageops::resize(&rgb, width, height, FilterType::Triangle)
}

/// Convert image to grayscale with BT.601 luma weights (0.299, 0.587, 0.114),
/// in 14-bit fixed point with rounding
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    map_colors(&rgb, |Rgb([r, g, b]): Rgb<u8>| {
        let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
        Luma([y as u8])
    })
}

/// Smooth with a separable kernel applied along both axes
pub fn apply_blur(img: &GrayImage, kernel: &[f32]) -> GrayImage {
    separable_filter_equal(img, kernel)
}

/// Detect edges with a two-threshold (Canny) detector.
/// `img` should already be blurred; no extra smoothing is applied.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny_edges(img, low_threshold, high_threshold)
}
