//! I/O error types for triage-io.

use std::path::PathBuf;

/// Errors from dataset discovery and result serialization.
///
/// Per-sample problems (an image without a mask, an undecodable file) are
/// never reported here; the dataset builder skips those samples.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when no condition category yields a single valid sample.
    #[error("no data found under {root}: expected benign/ and/or malignant/ with image/mask pairs")]
    NoDataFound {
        /// Root directory that was scanned.
        root: PathBuf,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV record cannot be written.
    #[error("cannot write CSV record to {path}")]
    CsvWrite {
        /// Path of the CSV file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a result artifact cannot be serialized to JSON.
    #[error("cannot serialize {path} to JSON")]
    SerializeJson {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },
}
