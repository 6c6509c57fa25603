use crate::config::ResizeStrategy;
use crate::error::{ForegroundMiss, IsolateError, Result};
use crate::isolation::{contours, mask, preprocessing};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use image::{DynamicImage, GrayImage};
use std::sync::Arc;

fn require_mask<'a>(data: &'a PipelineData, step: &str) -> Result<&'a GrayImage> {
    data.mask.as_ref().ok_or_else(|| IsolateError::StepPrecondition {
        step: step.to_string(),
        requirement: "a foreground mask from an earlier step",
    })
}

/// Normalize the photo to the working resolution.
/// The result also becomes the colour reference for later mask application.
pub struct ResizeStep {
    pub strategy: ResizeStrategy,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let resized = DynamicImage::ImageRgb8(preprocessing::normalize_scale(&data.image, self.strategy));

        if context.verbose {
            println!(
                "  Resized {}x{} to {}x{}",
                data.image.width(),
                data.image.height(),
                resized.width(),
                resized.height()
            );
        }

        Ok(PipelineData {
            original: Arc::new(resized.clone()),
            image: resized,
            mask: None,
            bbox: None,
            metadata: data.metadata,
        })
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(data.with_image(DynamicImage::ImageLuma8(gray)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply a small Gaussian blur
pub struct BlurStep {
    pub kernel: [f32; 3],
}

impl PipelineStep for BlurStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let blurred = preprocessing::apply_blur(&gray, &self.kernel);
        Ok(data.with_image(DynamicImage::ImageLuma8(blurred)))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
        Ok(data.with_image(DynamicImage::ImageLuma8(edges)))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Turn the edge map into the card mask: fill the largest contour,
/// threshold, then erode away stray foreground pixels
pub struct MaskStep {
    pub threshold: u8,
    pub erosion_kernel: u8,
    pub erosion_iterations: u32,
}

impl PipelineStep for MaskStep {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let edges = data.image.to_luma8();
        let found = contours::find_contours(&edges);

        let largest = contours::largest_contour(&found)
            .ok_or(IsolateError::NoForegroundDetected(ForegroundMiss::NoContours))?;
        let area = largest.area();

        if context.verbose {
            println!("  Found {} contours, largest encloses {:.1} px²", found.len(), area);
        }

        let filled = mask::fill_contour(&edges, largest);
        let binary = mask::threshold_mask(&filled, self.threshold);
        let eroded = mask::erode_mask(&binary, self.erosion_kernel, self.erosion_iterations);

        let mut new_data = data.with_image(DynamicImage::ImageLuma8(eroded.clone()));
        new_data.mask = Some(eroded);
        Ok(new_data
            .with_metadata("contour_count", MetadataValue::Int(found.len() as i64))
            .with_metadata("contour_area", MetadataValue::Float(area)))
    }

    fn name(&self) -> &str {
        "Mask"
    }
}

/// Black out everything outside the mask in the working colour image
pub struct ApplyMaskStep;

impl PipelineStep for ApplyMaskStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = require_mask(&data, self.name())?;
        let color = data.original.to_rgb8();

        if color.dimensions() != mask.dimensions() {
            return Err(IsolateError::StepPrecondition {
                step: self.name().to_string(),
                requirement: "a mask with the same dimensions as the working image",
            });
        }

        let masked = mask::apply_mask(&color, mask);
        Ok(data.with_image(DynamicImage::ImageRgb8(masked)))
    }

    fn name(&self) -> &str {
        "Apply Mask"
    }
}

/// Crop to the mask's bounding box plus a margin, clamped at the borders
pub struct CropStep {
    pub margin: u32,
}

impl PipelineStep for CropStep {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let mask = require_mask(&data, self.name())?;
        let bbox = mask::bounding_rect(mask)
            .ok_or(IsolateError::NoForegroundDetected(ForegroundMiss::EmptyMask))?;

        let img = data.image.to_rgb8();
        let (cropped, rect, clamped) = mask::crop_with_margin(&img, bbox, self.margin);

        if context.verbose && clamped {
            println!(
                "  Warning: card at ({}, {}) {}x{} touches the frame, margin clamped to {}x{}",
                bbox.x, bbox.y, bbox.width, bbox.height, rect.width, rect.height
            );
        }

        let mut new_data = data
            .with_image(DynamicImage::ImageRgb8(cropped))
            .with_metadata("clamped", MetadataValue::Bool(clamped));
        new_data.bbox = Some(rect);
        Ok(new_data)
    }

    fn name(&self) -> &str {
        "Crop"
    }
}
