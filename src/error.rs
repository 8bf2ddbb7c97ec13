/// Error types for each layer of the application
///
/// Storage faults propagate out of the catalog untouched; validation and
/// cover errors are turned into notices by the UI.
use thiserror::Error;

/// Failures raised by the record store or the worker that runs it
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// Failures while resolving paths or reading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine user data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while importing a cover image into app storage
#[derive(Error, Debug)]
pub enum CoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Rejections produced by the edit form before any store access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title and Developer cannot be empty.")]
    MissingRequired,

    #[error("Release date must look like 2024-05-31, got \"{0}\".")]
    InvalidReleaseDate(String),
}
