mod common;

use common::*;
use image::{DynamicImage, GenericImageView};

#[test]
fn test_isolates_centered_card() -> anyhow::Result<()> {
    let photo = centered_card_photo(1000, 1200);
    let isolator = CardIsolator::default();

    let card = isolator.isolate(&photo)?;
    let (w, h) = card.dimensions();

    assert!(w > 0 && h > 0);
    assert!(w < 250 && h < 300, "card {}x{} not smaller than working size", w, h);

    let rgb = card.to_rgb8();
    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        assert_eq!(rgb.get_pixel(x, y).0, [0, 0, 0], "corner ({}, {}) not black", x, y);
    }

    // The card body itself survives the mask
    let centre = rgb.get_pixel(w / 2, h / 8);
    assert!(centre.0.iter().any(|&c| c > 0));

    Ok(())
}

#[test]
fn test_isolation_details() -> anyhow::Result<()> {
    let photo = centered_card_photo(1000, 1200);
    let isolation = CardIsolator::default().isolate_labeled(&photo, "ace")?;

    assert!(isolation.contour_count >= 1);
    assert!(isolation.contour_area > 0.0);
    assert!(!isolation.clamped);
    assert!(isolation.crop.is_within(250, 300));
    assert_eq!(
        (isolation.crop.width, isolation.crop.height),
        isolation.card.dimensions()
    );

    // Card is 100x140 at working resolution; the crop hugs it
    assert!(isolation.crop.width >= 90 && isolation.crop.width <= 115);
    assert!(isolation.crop.height >= 130 && isolation.crop.height <= 155);

    Ok(())
}

#[test]
fn test_fixed_resize_bounds_output() -> anyhow::Result<()> {
    let config = IsolatorConfig::default().with_resize(ResizeStrategy::Fixed {
        width: 500,
        height: 600,
    });
    let isolator = CardIsolator::new(config)?;

    let card = isolator.isolate(&centered_card_photo(1000, 1200))?;
    assert!(card.width() > 0 && card.width() <= 500);
    assert!(card.height() > 0 && card.height() <= 600);

    Ok(())
}

#[test]
fn test_empty_photo_has_no_foreground() {
    let isolator = CardIsolator::default();
    let result = isolator.isolate(&empty_photo(400, 400));

    match result {
        Err(IsolateError::NoForegroundDetected(ForegroundMiss::NoContours)) => {}
        other => panic!("expected NoContours, got {:?}", other.map(|i| i.dimensions())),
    }
}

#[test]
fn test_card_touching_frame_is_clamped() -> anyhow::Result<()> {
    let photo = DynamicImage::ImageRgb8(card_photo_at(200, 200, 2, 40, 120, 120));
    let config = IsolatorConfig::default().with_resize(ResizeStrategy::Divisor(1));
    let isolation = CardIsolator::new(config)?.isolate_labeled(&photo, "edge")?;

    assert!(isolation.clamped);
    assert_eq!(isolation.crop.x, 0);
    assert!(isolation.crop.is_within(200, 200));
    assert_eq!(
        (isolation.crop.width, isolation.crop.height),
        isolation.card.dimensions()
    );

    Ok(())
}

#[test]
fn test_isolates_low_contrast_card() -> anyhow::Result<()> {
    let mut photo = image::RgbImage::from_pixel(200, 240, image::Rgb([195, 195, 195]));
    imageproc::drawing::draw_filled_rect_mut(
        &mut photo,
        imageproc::rect::Rect::at(50, 50).of_size(100, 140),
        image::Rgb([245, 245, 245]),
    );

    let config = IsolatorConfig::default().with_resize(ResizeStrategy::Divisor(1));
    let isolation = CardIsolator::new(config)?.isolate_labeled(&DynamicImage::ImageRgb8(photo), "pale")?;

    assert!(!isolation.clamped);
    assert!(isolation.crop.width >= 100 && isolation.crop.width <= 112);
    assert!(isolation.crop.height >= 140 && isolation.crop.height <= 152);
    assert_eq!(isolation.card.get_pixel(0, 0).0, [0, 0, 0]);

    Ok(())
}

#[test]
fn test_grayscale_input_is_accepted() -> anyhow::Result<()> {
    let photo = DynamicImage::ImageLuma8(centered_card_photo(400, 480).to_luma8());
    let card = CardIsolator::default().isolate(&photo)?;
    assert!(card.width() > 0 && card.height() > 0);
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let config = IsolatorConfig::default().with_resize(ResizeStrategy::Divisor(0));
    assert!(matches!(
        CardIsolator::new(config),
        Err(IsolateError::InvalidConfig(_))
    ));
}
