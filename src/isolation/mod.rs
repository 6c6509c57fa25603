//! Card isolation: cut the single foreground card out of a photo.
//!
//! The photo is scaled down, its edges traced, the largest traced contour
//! filled into a mask, and the masked photo cropped to that mask.

pub mod contours;
pub mod edges;
pub mod mask;
pub mod preprocessing;
pub mod steps;

use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::IsolatorConfig;
use crate::error::{IsolateError, Result};
use crate::models::Isolation;
use crate::pipeline::Pipeline;

pub use contours::{find_contours, largest_contour};
pub use mask::{apply_mask, bounding_rect, clamp_with_margin, crop_with_margin, erode_mask, fill_contour, threshold_mask};
pub use preprocessing::{apply_blur, detect_edges, load_photo, normalize_scale, to_grayscale};

/// Build the standard isolation pipeline from a config
pub fn build_standard_pipeline(config: &IsolatorConfig) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .add_step(Arc::new(ResizeStep { strategy: config.resize }))
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep { kernel: config.blur_kernel }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
        }))
        .add_step(Arc::new(MaskStep {
            threshold: config.mask_threshold,
            erosion_kernel: config.erosion_kernel,
            erosion_iterations: config.erosion_iterations,
        }))
        .add_step(Arc::new(ApplyMaskStep))
        .add_step(Arc::new(CropStep { margin: config.crop_margin }))
}

/// Isolates the playing card in a photo
#[derive(Clone)]
pub struct CardIsolator {
    config: IsolatorConfig,
    pipeline: Pipeline,
}

impl CardIsolator {
    pub fn new(config: IsolatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: build_standard_pipeline(&config),
            config,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.pipeline = self.pipeline.with_verbose(verbose);
        self
    }

    /// Save every intermediate stage under `output_dir` (must be empty)
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn config(&self) -> &IsolatorConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Crop the card out of `photo`, background blacked out
    pub fn isolate(&self, photo: &DynamicImage) -> Result<DynamicImage> {
        let isolation = self.isolate_labeled(photo, "photo")?;
        Ok(DynamicImage::ImageRgb8(isolation.card))
    }

    /// Like [`isolate`](Self::isolate) but keeps the crop details.
    /// `label` names this photo's files in debug output.
    pub fn isolate_labeled(&self, photo: &DynamicImage, label: &str) -> Result<Isolation> {
        let data = self.pipeline.run(photo.clone(), label)?;

        let crop = data.bbox.ok_or_else(|| IsolateError::StepPrecondition {
            step: "Crop".to_string(),
            requirement: "a crop rectangle at the end of the pipeline",
        })?;
        let clamped = data.get_bool("clamped").unwrap_or(false);
        let contour_count = data.get_int("contour_count").unwrap_or(0) as usize;
        let contour_area = data.get_float("contour_area").unwrap_or(0.0);

        let card = match data.image {
            DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };

        Ok(Isolation {
            card,
            crop,
            clamped,
            contour_count,
            contour_area,
        })
    }
}

impl Default for CardIsolator {
    fn default() -> Self {
        let config = IsolatorConfig::default();
        Self {
            pipeline: build_standard_pipeline(&config),
            config,
        }
    }
}
