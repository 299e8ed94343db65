use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wastekit operations.
#[derive(Debug, Error)]
pub enum WastekitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found: {}", path.display())]
    DirNotFound { path: PathBuf },

    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputNotCreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No image files found in {}", path.display())]
    NoImagesFound { path: PathBuf },

    #[error("No image/label pairs found in {}", path.display())]
    NoPairsFound { path: PathBuf },

    #[error("Invalid train ratio {value}: must lie strictly between 0 and 1")]
    InvalidRatio { value: f64 },

    #[error("Invalid class count {value}: must be at least 1")]
    InvalidClassCount { value: usize },

    #[error("Failed to write dataset descriptor to {}: {source}", path.display())]
    DescriptorWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse dataset descriptor {}: {source}", path.display())]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),

    #[error("Validation found {error_count} error(s) in {file_count} label file(s)")]
    ValidationFailed {
        error_count: usize,
        file_count: usize,
    },

    #[error("Download failed for {url}: {message}")]
    Fetch { url: String, message: String },
}
