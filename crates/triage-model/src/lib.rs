//! Priority labeling, stratified splitting, scaling, training, and
//! evaluation for the lesion triage pipeline.
//!
//! [`Pipeline`] composes the stages: the dataset builder from `triage-io`,
//! [`label_priorities`], [`SplitConfig::split`], [`StandardScaler`], a
//! [`Classifier`] (random forest by default), and [`evaluate`].

mod classifier;
mod error;
mod evaluate;
mod partition;
mod pipeline;
mod priority;
mod scaler;

pub use classifier::{Classifier, Predictor};
pub use error::ModelError;
pub use evaluate::{
    ClassSummary, ConfusionSummary, Evaluation, EvaluationSummary, FeatureImportance, evaluate,
};
pub use partition::{Partitions, SplitConfig};
pub use pipeline::{
    DEFAULT_N_TREES, EvaluationArtifact, LabeledDataset, PartitionSizes, Pipeline, PipelineConfig,
    PipelineReport, SampleCounts, ScalerSummary,
};
pub use priority::{BenignMedians, Priority, PriorityLabels, label_priorities};
pub use scaler::StandardScaler;
