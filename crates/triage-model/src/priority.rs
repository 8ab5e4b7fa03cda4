//! Three-level clinical priority derived from condition and benign medians.

use std::fmt;

use serde::Serialize;
use tracing::{info, instrument};

use triage_features::FeatureVector;
use triage_io::{Condition, Dataset};

/// Ordered triage priority. Encoded as `low = 0`, `medium = 1`, `high = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Benign and not above either benign median.
    Low,
    /// Benign with area or mean intensity above the benign median.
    Medium,
    /// Malignant.
    High,
}

impl Priority {
    /// Number of priority levels.
    pub const COUNT: usize = 3;

    /// Every level in encoding order.
    pub const ALL: [Priority; Self::COUNT] = [Priority::Low, Priority::Medium, Priority::High];

    /// Class names in encoding order, for reports.
    pub const NAMES: [&'static str; Self::COUNT] = ["low", "medium", "high"];

    /// Integer class label used by the classifier.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a classifier label.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Medians of `area` and `mean_intensity` over benign samples only.
///
/// Both are `0.0` when the dataset has no benign samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BenignMedians {
    /// Median foreground area.
    pub area: f64,
    /// Median foreground mean intensity.
    pub mean_intensity: f64,
}

impl BenignMedians {
    /// First pass: compute the medians from the benign subset.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let benign: Vec<&FeatureVector> = dataset
            .features()
            .iter()
            .zip(dataset.conditions())
            .filter(|&(_, &c)| c == Condition::Benign)
            .map(|(fv, _)| fv)
            .collect();
        Self {
            area: median(benign.iter().map(|fv| fv.area()).collect()),
            mean_intensity: median(benign.iter().map(|fv| fv.mean_intensity()).collect()),
        }
    }

    /// Second pass: the priority of one sample.
    #[must_use]
    pub fn priority(&self, features: &FeatureVector, condition: Condition) -> Priority {
        match condition {
            Condition::Malignant => Priority::High,
            Condition::Benign
                if features.area() > self.area
                    || features.mean_intensity() > self.mean_intensity =>
            {
                Priority::Medium
            }
            Condition::Benign => Priority::Low,
        }
    }
}

/// Priorities aligned with a [`Dataset`], plus the medians that produced them.
#[derive(Debug, Clone)]
pub struct PriorityLabels {
    labels: Vec<Priority>,
    medians: BenignMedians,
}

impl PriorityLabels {
    /// Priorities in sample order.
    #[must_use]
    pub fn labels(&self) -> &[Priority] {
        &self.labels
    }

    /// Encoded labels (`low = 0`, `medium = 1`, `high = 2`) in sample order.
    #[must_use]
    pub fn encoded(&self) -> Vec<usize> {
        self.labels.iter().map(|p| p.index()).collect()
    }

    /// Lowercase names in sample order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.labels.iter().map(|p| p.name()).collect()
    }

    /// The benign medians used as thresholds.
    #[must_use]
    pub fn medians(&self) -> BenignMedians {
        self.medians
    }

    /// Number of samples with the given priority.
    #[must_use]
    pub fn count(&self, priority: Priority) -> usize {
        self.labels.iter().filter(|&&p| p == priority).count()
    }
}

/// Label every sample: malignant is high; benign is medium when its area or
/// mean intensity exceeds the benign median, otherwise low.
///
/// The result depends only on the dataset contents, not on sample order.
#[instrument(skip_all, fields(n_samples = dataset.n_samples()))]
pub fn label_priorities(dataset: &Dataset) -> PriorityLabels {
    let medians = BenignMedians::from_dataset(dataset);
    let labels: Vec<Priority> = dataset
        .features()
        .iter()
        .zip(dataset.conditions())
        .map(|(fv, &condition)| medians.priority(fv, condition))
        .collect();
    let labeled = PriorityLabels { labels, medians };
    info!(
        median_area = medians.area,
        median_intensity = medians.mean_intensity,
        low = labeled.count(Priority::Low),
        medium = labeled.count(Priority::Medium),
        high = labeled.count(Priority::High),
        "priority labels assigned"
    );
    labeled
}

/// Median of `values`; the mean of the two middle values for an even
/// count, `0.0` for none.
pub(crate) fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
