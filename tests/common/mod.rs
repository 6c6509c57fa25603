mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardprep for tests
pub use cardprep::{
    BatchEvent, BatchReport, BatchRunner, BoundingBox, CardIsolator, ErrorPolicy, ForegroundMiss,
    IsolateError, IsolatorConfig, ResizeStrategy,
};
