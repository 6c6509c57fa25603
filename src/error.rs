use std::fmt;

/// Why the isolator decided there is no card in the photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundMiss {
    /// The edge map produced no contours at all
    NoContours,
    /// The eroded mask has no foreground pixels left to bound
    EmptyMask,
}

impl fmt::Display for ForegroundMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContours => write!(f, "edge map contains no contours"),
            Self::EmptyMask => write!(f, "mask is empty after erosion"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IsolateError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("no foreground detected: {0}")]
    NoForegroundDetected(ForegroundMiss),

    #[error("invalid isolator configuration: {0}")]
    InvalidConfig(String),

    #[error("step '{step}' requires {requirement}")]
    StepPrecondition {
        step: String,
        requirement: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IsolateError>;
