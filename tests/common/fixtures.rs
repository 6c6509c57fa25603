use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Felt-green tabletop used as the uniform background
pub const BACKGROUND: Rgb<u8> = Rgb([40, 90, 40]);
pub const CARD_WHITE: Rgb<u8> = Rgb([250, 250, 250]);
pub const PIP_RED: Rgb<u8> = Rgb([200, 20, 30]);

/// A photo of one white card with a few red pips, placed at (`x`, `y`)
pub fn card_photo_at(width: u32, height: u32, x: i32, y: i32, card_w: u32, card_h: u32) -> RgbImage {
    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);
    draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(card_w, card_h), CARD_WHITE);

    let pip_w = (card_w / 8).max(2);
    let pip_h = (card_h / 10).max(2);
    for (fx, fy) in [(0.25, 0.2), (0.65, 0.2), (0.45, 0.5), (0.25, 0.75), (0.65, 0.75)] {
        let px = x + (card_w as f32 * fx) as i32;
        let py = y + (card_h as f32 * fy) as i32;
        draw_filled_rect_mut(&mut img, Rect::at(px, py).of_size(pip_w, pip_h), PIP_RED);
    }

    img
}

/// A photo with the card centred
pub fn centered_card_photo(width: u32, height: u32) -> DynamicImage {
    let card_w = width * 2 / 5;
    let card_h = height * 7 / 15;
    let x = ((width - card_w) / 2) as i32;
    let y = ((height - card_h) / 2) as i32;
    DynamicImage::ImageRgb8(card_photo_at(width, height, x, y, card_w, card_h))
}

/// A photo with nothing on it but the background
pub fn empty_photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, BACKGROUND))
}

/// Write a centred card photo into `dir` under `name`
pub fn write_card_photo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    centered_card_photo(400, 480)
        .save(&path)
        .expect("Failed to save test photo");
    path
}

pub fn count_on_pixels(mask: &image::GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

/// Write a photo whose card sits 2px from the left edge of the frame
pub fn write_edge_card_photo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    card_photo_at(200, 200, 2, 40, 120, 120)
        .save(&path)
        .expect("Failed to save test photo");
    path
}
