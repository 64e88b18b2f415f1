//! Error types for constructing and configuring an easel.

use crate::style::ColorParseError;
use kurbo::Size;
use thiserror::Error;

/// Easel errors.
#[derive(Debug, Error)]
pub enum EaselError {
    #[error("Surface dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Surface is {actual:?}, expected {expected:?}")]
    SurfaceMismatch { expected: Size, actual: Size },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid colour: {0}")]
    InvalidColor(#[from] ColorParseError),
}

/// Result type for easel operations.
pub type EaselResult<T> = Result<T, EaselError>;
