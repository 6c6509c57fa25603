use image::{DynamicImage, GrayImage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{IsolateError, Result};
use crate::models::BoundingBox;

/// Data that flows through the pipeline.
/// Each PipelineData is one photo at some stage of isolation.
#[derive(Clone)]
pub struct PipelineData {
    /// Output of the most recent step (colour, grayscale, edge map or mask)
    pub image: DynamicImage,

    /// The scale-normalized colour photo (shared efficiently via Arc)
    pub original: Arc<DynamicImage>,

    /// Foreground mask, once a mask step has run
    pub mask: Option<GrayImage>,

    /// Crop rectangle in the working image, once a crop step has run
    pub bbox: Option<BoundingBox>,

    /// Metadata for tracking properties (e.g., "contour_count", "clamped")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Bool(bool),
    Float(f64),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a freshly decoded photo
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            mask: None,
            bbox: None,
            metadata: HashMap::new(),
        }
    }

    /// Replace the stage image, keeping everything else
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = image;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<&PathBuf> {
        self.debug.as_ref().map(|d| &d.output_dir)
    }

    /// Save one stage image under `<debug_dir>/<stage_dir>/<label>.png`
    fn save_debug_image(&self, stage_dir: &str, label: &str, image: &DynamicImage) -> Result<()> {
        let Some(root) = self.debug_dir() else {
            return Ok(());
        };

        let dir = root.join(stage_dir);
        std::fs::create_dir_all(&dir)?;
        let filename = format!("{}.png", label);
        image
            .save(dir.join(&filename))
            .map_err(|e| IsolateError::Io(std::io::Error::other(e)))?;

        if self.verbose {
            println!("  Debug: saved {}/{}", stage_dir, filename);
        }

        Ok(())
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one photo's data into the next stage
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in verbose and debug output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(IsolateError::InvalidConfig(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on one photo. `label` names the photo in debug output.
    pub fn run(&self, input: DynamicImage, label: &str) -> Result<PipelineData> {
        self.run_partial(input, label, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, label: &str, num_steps: usize) -> Result<PipelineData> {
        self.context.save_debug_image("00_input", label, &input)?;

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                println!("Running step {}: {}", step_idx + 1, step.name());
            }

            data = step.process(data, &self.context)?;

            let stage_dir = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.context.save_debug_image(&stage_dir, label, &data.image)?;

            if self.context.verbose {
                println!("  → {}x{}", data.image.width(), data.image.height());
            }
        }

        Ok(data)
    }
}
