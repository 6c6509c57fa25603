//! Isolator parameters.
//!
//! The defaults were tuned against photos shrunk to a quarter of their
//! camera resolution; change `resize` and the thresholds together.

use crate::error::{IsolateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_RESIZE_DIVISOR: u32 = 4;
/// Separable 3x3 Gaussian with sigma derived from the kernel size
pub const DEFAULT_BLUR_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 100.0;
pub const DEFAULT_MASK_THRESHOLD: u8 = 180;
pub const DEFAULT_EROSION_KERNEL: u8 = 5;
pub const DEFAULT_EROSION_ITERATIONS: u32 = 1;
pub const DEFAULT_CROP_MARGIN: u32 = 5;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// How a photo is brought to the working resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStrategy {
    /// Divide both axes by this factor (truncating, never below 1px)
    Divisor(u32),
    /// Resize to an absolute size, ignoring the aspect ratio
    Fixed { width: u32, height: u32 },
}

impl ResizeStrategy {
    /// Working dimensions for a photo of the given size
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::Divisor(d) => {
                let d = d.max(1);
                ((width / d).max(1), (height / d).max(1))
            }
            Self::Fixed { width, height } => (width, height),
        }
    }
}

impl Default for ResizeStrategy {
    fn default() -> Self {
        Self::Divisor(DEFAULT_RESIZE_DIVISOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolatorConfig {
    pub resize: ResizeStrategy,
    pub blur_kernel: [f32; 3],
    pub canny_low: f32,
    pub canny_high: f32,
    /// Filled-silhouette pixels at or above this value become foreground
    pub mask_threshold: u8,
    /// Side of the square erosion element; must be odd
    pub erosion_kernel: u8,
    pub erosion_iterations: u32,
    /// Pixels added on every side of the mask's bounding box
    pub crop_margin: u32,
    pub jpeg_quality: u8,
}

impl Default for IsolatorConfig {
    fn default() -> Self {
        Self {
            resize: ResizeStrategy::default(),
            blur_kernel: DEFAULT_BLUR_KERNEL,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            erosion_kernel: DEFAULT_EROSION_KERNEL,
            erosion_iterations: DEFAULT_EROSION_ITERATIONS,
            crop_margin: DEFAULT_CROP_MARGIN,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl IsolatorConfig {
    /// Load a config from JSON; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            IsolateError::InvalidConfig(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_resize(mut self, resize: ResizeStrategy) -> Self {
        self.resize = resize;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.resize {
            ResizeStrategy::Divisor(0) => {
                return Err(IsolateError::InvalidConfig("resize divisor must be at least 1".into()));
            }
            ResizeStrategy::Fixed { width, height } if width == 0 || height == 0 => {
                return Err(IsolateError::InvalidConfig(format!(
                    "fixed resize must be non-empty, got {}x{}",
                    width, height
                )));
            }
            _ => {}
        }

        if self.canny_low > self.canny_high {
            return Err(IsolateError::InvalidConfig(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.canny_low, self.canny_high
            )));
        }

        if self.erosion_kernel == 0 || self.erosion_kernel % 2 == 0 {
            return Err(IsolateError::InvalidConfig(format!(
                "erosion kernel must be odd, got {}",
                self.erosion_kernel
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(IsolateError::InvalidConfig(format!(
                "jpeg quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }

        Ok(())
    }
}
