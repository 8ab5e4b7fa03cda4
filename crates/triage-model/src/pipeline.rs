//! End-to-end pipeline: build, label, split, scale, train, evaluate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use triage_io::{Condition, Dataset, DatasetBuilder};
use triage_rf::RandomForestConfig;

use crate::classifier::{Classifier, Predictor};
use crate::error::ModelError;
use crate::evaluate::{Evaluation, EvaluationSummary, FeatureImportance, evaluate};
use crate::partition::{Partitions, SplitConfig};
use crate::priority::{BenignMedians, Priority, PriorityLabels, label_priorities};
use crate::scaler::StandardScaler;

/// Number of trees in the default forest.
pub const DEFAULT_N_TREES: usize = 100;

/// Configuration for a full pipeline run.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `split`   | [`SplitConfig::default`] (0.3 holdout, half to test, seed 42) |
/// | `forest`  | 100 trees, sqrt features, Gini, seed 42 |
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    data_root: PathBuf,
    split: SplitConfig,
    forest: RandomForestConfig,
}

impl PipelineConfig {
    /// Create a config reading samples from `data_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Classifier`] if the default forest config is rejected.
    pub fn new(data_root: &Path) -> Result<Self, ModelError> {
        Ok(Self {
            data_root: data_root.to_path_buf(),
            split: SplitConfig::default(),
            forest: RandomForestConfig::new(DEFAULT_N_TREES)?,
        })
    }

    /// Set the split configuration.
    #[must_use]
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Set the forest configuration.
    #[must_use]
    pub fn with_forest(mut self, forest: RandomForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Return the dataset root.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Return the split configuration.
    #[must_use]
    pub fn split(&self) -> &SplitConfig {
        &self.split
    }

    /// Return the forest configuration.
    #[must_use]
    pub fn forest(&self) -> &RandomForestConfig {
        &self.forest
    }
}

/// A dataset with its derived priorities.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    /// Extracted features and conditions.
    pub dataset: Dataset,
    /// Priorities aligned with `dataset`.
    pub priorities: PriorityLabels,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Dataset and priorities.
    pub labeled: LabeledDataset,
    /// Partition membership.
    pub partitions: Partitions,
    /// Scaler fit on the training partition.
    pub scaler: StandardScaler,
    /// Validation metrics.
    pub validation: Evaluation,
    /// Test metrics.
    pub test: Evaluation,
    /// Ranked feature importances of the fitted model (empty if unsupported).
    pub importances: Vec<FeatureImportance>,
}

/// Sample counts by condition and priority.
#[derive(Debug, Clone, Serialize)]
pub struct SampleCounts {
    /// All samples.
    pub total: usize,
    /// Benign samples.
    pub benign: usize,
    /// Malignant samples.
    pub malignant: usize,
    /// Low priority samples.
    pub low: usize,
    /// Medium priority samples.
    pub medium: usize,
    /// High priority samples.
    pub high: usize,
}

/// Partition sizes.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionSizes {
    /// Training samples.
    pub train: usize,
    /// Validation samples.
    pub validation: usize,
    /// Test samples.
    pub test: usize,
}

/// Scaler statistics keyed by feature order.
#[derive(Debug, Clone, Serialize)]
pub struct ScalerSummary {
    /// Feature names.
    pub features: Vec<&'static str>,
    /// Per-feature training mean.
    pub mean: Vec<f64>,
    /// Per-feature training population std.
    pub std: Vec<f64>,
}

/// The `{experiment}_evaluate.json` document.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationArtifact {
    /// Sample counts.
    pub samples: SampleCounts,
    /// Partition sizes.
    pub partitions: PartitionSizes,
    /// Benign medians used by the labeler.
    pub benign_medians: BenignMedians,
    /// Scaler statistics.
    pub scaler: ScalerSummary,
    /// Validation metrics.
    pub validation: EvaluationSummary,
    /// Test metrics.
    pub test: EvaluationSummary,
    /// Ranked feature importances.
    pub feature_importances: Vec<FeatureImportance>,
}

impl PipelineReport {
    /// Build the serializable evaluation artifact.
    #[must_use]
    pub fn artifact(&self) -> EvaluationArtifact {
        let LabeledDataset {
            dataset,
            priorities,
        } = &self.labeled;
        EvaluationArtifact {
            samples: SampleCounts {
                total: dataset.n_samples(),
                benign: dataset.count(Condition::Benign),
                malignant: dataset.count(Condition::Malignant),
                low: priorities.count(Priority::Low),
                medium: priorities.count(Priority::Medium),
                high: priorities.count(Priority::High),
            },
            partitions: PartitionSizes {
                train: self.partitions.train.len(),
                validation: self.partitions.validation.len(),
                test: self.partitions.test.len(),
            },
            benign_medians: priorities.medians(),
            scaler: ScalerSummary {
                features: triage_features::FEATURE_NAMES.to_vec(),
                mean: self.scaler.mean().to_vec(),
                std: self.scaler.std().to_vec(),
            },
            validation: self.validation.summary(),
            test: self.test.summary(),
            feature_importances: self.importances.clone(),
        }
    }
}

/// Composes the pipeline stages; each stage's output feeds the next.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from a config.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Return the pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the dataset and label it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] wrapping `NoDataFound` when no valid
    /// sample exists under the root.
    #[instrument(skip_all, fields(root = %self.config.data_root.display()))]
    pub fn extract(&self) -> Result<LabeledDataset, ModelError> {
        let dataset = DatasetBuilder::new(&self.config.data_root).build()?;
        let priorities = label_priorities(&dataset);
        Ok(LabeledDataset {
            dataset,
            priorities,
        })
    }

    /// Run every stage with the configured random forest.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::Io`] | No valid sample under the root |
    /// | [`ModelError::EmptyPartition`] | Too few samples to fill train, validation and test |
    /// | [`ModelError::Classifier`] | Training or scoring failed |
    pub fn run(&self) -> Result<PipelineReport, ModelError> {
        self.run_with(&self.config.forest)
    }

    /// Run every stage with a caller-supplied classifier.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::run`].
    #[instrument(skip_all, fields(root = %self.config.data_root.display()))]
    pub fn run_with<C: Classifier>(&self, classifier: &C) -> Result<PipelineReport, ModelError> {
        let labeled = self.extract()?;
        let encoded = labeled.priorities.encoded();
        let partitions = self.config.split.split(&encoded)?;

        let matrix = labeled.dataset.feature_matrix();
        let rows = |idx: &[usize]| -> Vec<Vec<f64>> { idx.iter().map(|&i| matrix[i].clone()).collect() };
        let labels = |idx: &[usize]| -> Vec<usize> { idx.iter().map(|&i| encoded[i]).collect() };

        let scaler = StandardScaler::fit(&rows(&partitions.train));
        let train_x = scaler.transform(&rows(&partitions.train));
        let val_x = scaler.transform(&rows(&partitions.validation));
        let test_x = scaler.transform(&rows(&partitions.test));

        let model = classifier.fit(&train_x, &labels(&partitions.train), Priority::COUNT)?;
        let validation = evaluate(&model, "validation", &val_x, &labels(&partitions.validation))?;
        let test = evaluate(&model, "test", &test_x, &labels(&partitions.test))?;
        let importances = model.feature_importances();

        info!(
            val_accuracy = validation.accuracy(),
            val_macro_f1 = validation.macro_f1(),
            test_accuracy = test.accuracy(),
            test_macro_f1 = test.macro_f1(),
            "pipeline complete"
        );

        Ok(PipelineReport {
            labeled,
            partitions,
            scaler,
            validation,
            test,
            importances,
        })
    }
}
