//! Two-threshold edge detection on an already smoothed image.
//!
//! Gradients are 3x3 Sobel with L1 magnitude; no further smoothing happens
//! here, so the thresholds apply to the caller's blurred image directly.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// tan(22.5°) and tan(67.5°): boundaries between the four gradient directions
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

type Magnitudes = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Edge map with 255 on edge pixels and 0 elsewhere
pub fn canny_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);

    let magnitude: Magnitudes = ImageBuffer::from_fn(width, height, |x, y| {
        let dx = gx.get_pixel(x, y)[0] as i32;
        let dy = gy.get_pixel(x, y)[0] as i32;
        Luma([dx.unsigned_abs() + dy.unsigned_abs()])
    });

    let mag_at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            0.0
        } else {
            magnitude.get_pixel(x as u32, y as u32)[0] as f32
        }
    };

    // 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut class = vec![0u8; (width as usize) * (height as usize)];
    let mut strong = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let m = magnitude.get_pixel(x, y)[0] as f32;
            if m <= low_threshold {
                continue;
            }

            let dx = gx.get_pixel(x, y)[0] as f32;
            let dy = gy.get_pixel(x, y)[0] as f32;
            let (ax, ay) = (dx.abs(), dy.abs());
            let (xi, yi) = (x as i64, y as i64);

            let is_peak = if ay < ax * TAN_22_5 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s = if (dx < 0.0) != (dy < 0.0) { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };

            if !is_peak {
                continue;
            }

            let idx = (y * width + x) as usize;
            if m > high_threshold {
                class[idx] = 2;
                strong.push((x, y));
            } else {
                class[idx] = 1;
            }
        }
    }

    let mut edges = GrayImage::new(width, height);
    for &(x, y) in &strong {
        edges.put_pixel(x, y, Luma([255]));
    }

    // Hysteresis: grow strong edges into 8-connected weak candidates
    while let Some((x, y)) = strong.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let idx = (ny * width + nx) as usize;
                if class[idx] == 1 {
                    class[idx] = 2;
                    edges.put_pixel(nx, ny, Luma([255]));
                    strong.push((nx, ny));
                }
            }
        }
    }

    edges
}
