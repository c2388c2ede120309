//! Error types for vegscan

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vegscan operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scene identifier '{id}': {reason}")]
    InvalidSceneId { id: String, reason: String },

    #[error("Missing {artifact}: {path}")]
    MissingInput { artifact: String, path: PathBuf },

    #[error("Raster grid mismatch: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}")]
    GridMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Geoprocessing provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Provider(e.to_string())
    }
}

impl Error {
    /// Build a `MissingInput` from an artifact label and path
    pub fn missing(artifact: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::MissingInput {
            artifact: artifact.into(),
            path: path.into(),
        }
    }
}

/// Result type alias for vegscan operations
pub type Result<T> = std::result::Result<T, Error>;
