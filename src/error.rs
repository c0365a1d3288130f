//! Error types for pagelayout library.

use std::io;
use thiserror::Error;

/// Result type alias for pagelayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model-to-page scale ratio is unusable.
    #[error("Invalid scale ratio on page {page}: horizontal={horizontal}, vertical={vertical}")]
    InvalidScale {
        /// Page index
        page: usize,
        /// Model width divided by page width
        horizontal: f64,
        /// Model height divided by page height
        vertical: f64,
    },

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// A bounding box with zero or negative area.
    #[error("Degenerate bounding box: {0:?}")]
    DegenerateBBox([i32; 4]),

    /// A detection entry is missing required fields.
    #[error("Malformed detection: {0}")]
    MalformedDetection(String),

    /// The page rasterizer could not produce pixels for a region.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// The media store could not persist a crop.
    #[error("Media store error: {0}")]
    MediaStore(String),

    /// An input provider failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
