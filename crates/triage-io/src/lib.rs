//! Sample discovery, dataset assembly, and result artifacts for the triage pipeline.

mod builder;
mod discover;
mod domain;
mod error;
mod writer;

pub use builder::{BuildSummary, DatasetBuilder};
pub use discover::{IMAGE_EXTENSION, MASK_SUFFIX, SamplePair};
pub use domain::{Condition, Dataset, ExperimentName};
pub use error::IoError;
pub use writer::ResultWriter;
