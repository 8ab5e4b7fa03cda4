//! Domain types for triage-io.

use std::fmt;

use triage_features::FeatureVector;

use crate::IoError;

/// Ground-truth condition of a sample, fixed by the subdirectory it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    /// Non-cancerous finding.
    Benign,
    /// Cancerous finding.
    Malignant,
}

impl Condition {
    /// Every condition, in discovery order.
    pub const ALL: [Condition; 2] = [Condition::Benign, Condition::Malignant];

    /// Name of the subdirectory holding samples of this condition.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Condition::Benign => "benign",
            Condition::Malignant => "malignant",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Prefix for artifact file names; one or more of `[a-zA-Z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

impl ExperimentName {
    /// # Errors
    ///
    /// [`IoError::InvalidExperimentName`] for an empty name or one that
    /// could escape the output directory.
    pub fn new(name: String) -> Result<Self, IoError> {
        if !name.is_empty() && name.chars().all(is_name_char) {
            Ok(Self(name))
        } else {
            Err(IoError::InvalidExperimentName { name })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        out.write_str(self.as_str())
    }
}

/// Extracted features with their ground-truth conditions.
///
/// Sample ids, feature vectors, and conditions are parallel vectors:
/// index `i` in each refers to the same sample. Order is discovery order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    sample_ids: Vec<String>,
    features: Vec<FeatureVector>,
    conditions: Vec<Condition>,
}

impl Dataset {
    /// Build a dataset from parallel feature and condition vectors.
    ///
    /// Samples get positional ids (`"0"`, `"1"`, ...).
    ///
    /// # Panics
    ///
    /// Panics if `features` and `conditions` differ in length.
    #[must_use]
    pub fn new(features: Vec<FeatureVector>, conditions: Vec<Condition>) -> Self {
        assert_eq!(
            features.len(),
            conditions.len(),
            "features and conditions must be aligned"
        );
        let sample_ids = (0..features.len()).map(|i| i.to_string()).collect();
        Self {
            sample_ids,
            features,
            conditions,
        }
    }

    pub(crate) fn push(&mut self, sample_id: String, features: FeatureVector, condition: Condition) {
        self.sample_ids.push(sample_id);
        self.features.push(features);
        self.conditions.push(condition);
    }

    /// Sample identifiers (`<condition>/<image file stem>` for discovered data).
    #[must_use]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Feature vectors in sample order.
    #[must_use]
    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    /// Ground-truth conditions in sample order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Feature matrix as owned rows, `matrix[sample][feature]`.
    #[must_use]
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        self.features.iter().map(FeatureVector::to_vec).collect()
    }

    /// Number of samples with the given condition.
    #[must_use]
    pub fn count(&self, condition: Condition) -> usize {
        self.conditions.iter().filter(|&&c| c == condition).count()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(area: f64) -> FeatureVector {
        FeatureVector::from_array([area, 1.0, 0.0, 2.0, 2.0, 4.0])
    }

    #[test]
    fn accepts_dashes_and_underscores() {
        let name = ExperimentName::new("busi-run_01".to_string()).unwrap();
        assert_eq!(name.to_string(), "busi-run_01");
    }

    #[test]
    fn rejects_empty_and_path_like_names() {
        for bad in ["", "../escape", "a b", "out/name"] {
            assert!(
                matches!(
                    ExperimentName::new(bad.to_string()),
                    Err(IoError::InvalidExperimentName { .. })
                ),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn condition_dir_names() {
        assert_eq!(Condition::Benign.dir_name(), "benign");
        assert_eq!(Condition::Malignant.to_string(), "malignant");
    }

    #[test]
    fn dataset_counts_by_condition() {
        let ds = Dataset::new(
            vec![fv(1.0), fv(2.0), fv(3.0)],
            vec![Condition::Benign, Condition::Malignant, Condition::Benign],
        );
        assert!(!ds.is_empty());
        assert_eq!(ds.count(Condition::Benign), 2);
        assert_eq!(ds.count(Condition::Malignant), 1);
        assert_eq!(ds.sample_ids(), &["0", "1", "2"]);
        assert_eq!(ds.feature_matrix()[1][0], 2.0);
    }

    #[test]
    #[should_panic(expected = "aligned")]
    fn dataset_rejects_misaligned_vectors() {
        let _ = Dataset::new(vec![fv(1.0)], vec![]);
    }
}
