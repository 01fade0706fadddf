//! Error types for chunkscribe.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    // Source input errors
    #[error("Input not readable: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to probe {}: {}", .path.display(), .message)]
    Probe { path: PathBuf, message: String },

    // Segmentation errors
    #[error("Segmentation failed for {source}: {message}")]
    Segmentation { r#source: String, message: String },

    // External tool errors
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Segment {segment} failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        segment: String,
        attempts: u32,
        message: String,
    },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PipelineError>;
