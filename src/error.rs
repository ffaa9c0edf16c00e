use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cub-tfrecord operations.
///
/// Every variant is fatal: it aborts the conversion. Per-image failures
/// are reported through [`TranscodeError`](crate::transcode::TranscodeError)
/// instead and only cause the image to be skipped.
#[derive(Debug, Error)]
pub enum CubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path} at line {line}: {message}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Manifests {split_path} and {images_path} disagree: {message}")]
    ManifestMismatch {
        split_path: PathBuf,
        images_path: PathBuf,
        message: String,
    },

    #[error("No split assignment for image '{filename}'")]
    MissingSplitAssignment { filename: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to traverse {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to write shard {path}: {source}")]
    ShardWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {worker} panicked while writing the {split} split")]
    WorkerPanicked { split: String, worker: usize },

    #[error("Failed to read records from {path}: {message}")]
    RecordDecode { path: PathBuf, message: String },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
