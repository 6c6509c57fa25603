pub mod batch;
pub mod config;
pub mod error;
pub mod isolation;
pub mod model_fetch;
pub mod models;
pub mod pipeline;

pub use batch::{BatchEvent, BatchObserver, BatchReport, BatchRunner, ErrorPolicy};
pub use config::{IsolatorConfig, ResizeStrategy};
pub use error::{ForegroundMiss, IsolateError};
pub use isolation::CardIsolator;
pub use model_fetch::{ArtifactSource, GoogleDriveSource, ModelFetcher};
pub use models::{BoundingBox, Contour, Isolation};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep, DebugConfig};
