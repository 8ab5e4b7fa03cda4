//! Held-out evaluation: accuracy, macro F1, report, and confusion matrix.

use serde::Serialize;
use tracing::{info, instrument};

use triage_rf::{ClassificationReport, ConfusionMatrix};

use crate::classifier::Predictor;
use crate::error::ModelError;
use crate::priority::Priority;

/// A ranked feature importance, as reported in the evaluation artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub name: String,
    /// Normalized importance (sums to 1.0 across features).
    pub importance: f64,
    /// 1 = most important.
    pub rank: usize,
}

/// Metrics for one partition.
#[derive(Debug, Clone)]
pub struct Evaluation {
    partition: &'static str,
    confusion: ConfusionMatrix,
    report: ClassificationReport,
}

impl Evaluation {
    /// Name of the evaluated partition.
    #[must_use]
    pub fn partition(&self) -> &'static str {
        self.partition
    }

    /// Fraction of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }

    /// Unweighted mean F1 over all three priority levels.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        self.confusion.macro_f1()
    }

    /// 3x3 matrix, rows true and columns predicted, in low/medium/high order.
    #[must_use]
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    /// Per-class precision/recall/F1 table.
    #[must_use]
    pub fn report(&self) -> &ClassificationReport {
        &self.report
    }

    /// Serializable snapshot for the evaluation artifact.
    #[must_use]
    pub fn summary(&self) -> EvaluationSummary {
        let classes = self
            .report
            .metrics()
            .iter()
            .zip(Priority::NAMES)
            .map(|(m, name)| ClassSummary {
                name,
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();
        EvaluationSummary {
            partition: self.partition,
            n_samples: self.confusion.as_rows().iter().flatten().sum(),
            accuracy: self.accuracy(),
            macro_f1: self.macro_f1(),
            classes,
            confusion_matrix: ConfusionSummary {
                labels: Priority::NAMES,
                rows: self.confusion.as_rows().to_vec(),
            },
        }
    }
}

/// Per-class row of [`EvaluationSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    /// Priority name.
    pub name: &'static str,
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// F1 score.
    pub f1: f64,
    /// True samples of this class.
    pub support: usize,
}

/// Confusion matrix with its class names, for heatmap rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ConfusionSummary {
    /// Row and column labels.
    pub labels: [&'static str; Priority::COUNT],
    /// `rows[true][predicted]`.
    pub rows: Vec<Vec<usize>>,
}

/// Serializable metrics for one partition.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// Partition name.
    pub partition: &'static str,
    /// Number of evaluated samples.
    pub n_samples: usize,
    /// Accuracy.
    pub accuracy: f64,
    /// Macro-averaged F1.
    pub macro_f1: f64,
    /// Per-class metrics in low/medium/high order.
    pub classes: Vec<ClassSummary>,
    /// Confusion matrix.
    pub confusion_matrix: ConfusionSummary,
}

/// Predict `features` with `model` and score against `labels`.
///
/// # Errors
///
/// Propagates prediction failures and [`ModelError::Classifier`] for an
/// empty partition or out-of-range labels.
///
/// # Panics
///
/// Panics if `features` and `labels` differ in length.
#[instrument(skip_all, fields(partition = partition, n_samples = features.len()))]
pub fn evaluate<P: Predictor + ?Sized>(
    model: &P,
    partition: &'static str,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<Evaluation, ModelError> {
    assert_eq!(features.len(), labels.len(), "features and labels must be aligned");
    let predicted = model.predict(features)?;
    let confusion = ConfusionMatrix::from_labels(labels, &predicted, Priority::COUNT)?;
    let report = confusion.report(&Priority::NAMES);
    let evaluation = Evaluation {
        partition,
        confusion,
        report,
    };
    info!(
        accuracy = evaluation.accuracy(),
        macro_f1 = evaluation.macro_f1(),
        "partition evaluated"
    );
    Ok(evaluation)
}
