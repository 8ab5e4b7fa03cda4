//! Error types for triage-model.

use triage_io::IoError;
use triage_rf::RfError;

/// Errors from labeling, splitting, training, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Dataset discovery or artifact writing failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Classifier training, prediction, or metric computation failed.
    #[error(transparent)]
    Classifier(#[from] RfError),

    /// Returned when a split fraction lies outside (0.0, 1.0).
    #[error("{name} must be in (0.0, 1.0), got {value}")]
    InvalidFraction {
        /// Name of the offending setting.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },

    /// Returned when the dataset is too small to give every partition a sample.
    #[error("{partition} partition would be empty with {n_samples} samples")]
    EmptyPartition {
        /// Partition that came out empty.
        partition: &'static str,
        /// Number of samples being split at that step.
        n_samples: usize,
    },
}
