//! Forest hyperparameters and the `fit` entry point.

use crate::error::RfError;
use crate::forest::RandomForestResult;
use crate::split::SplitCriterion;

/// How many candidate features each split search may examine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n))`, at least 1.
    Sqrt,
    /// `floor(log2(n))`, at least 1.
    Log2,
    /// `floor(f * n)`, at least 1; `f` in (0.0, 1.0].
    Fraction(f64),
    /// Exactly this many.
    Fixed(usize),
    /// Every column.
    All,
}

impl MaxFeatures {
    /// Turn the strategy into a count for a matrix with `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] unless the count is in `1..=n_features`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let n = n_features as f64;
        let count = match self {
            Self::Sqrt => n.sqrt().floor().max(1.0) as usize,
            Self::Log2 => n.log2().floor().max(1.0) as usize,
            Self::Fraction(f) => (n * f).floor().max(1.0) as usize,
            Self::Fixed(k) => k,
            Self::All => n_features,
        };
        if (1..=n_features).contains(&count) {
            Ok(count)
        } else {
            Err(RfError::InvalidMaxFeatures {
                max_features: count,
                n_features,
            })
        }
    }
}

/// Hyperparameters of a random forest classifier.
///
/// Only the tree count is checked by [`RandomForestConfig::new`]; the
/// remaining settings are checked when [`RandomForestConfig::fit`] runs.
///
/// # Defaults
///
/// | Setting              | Value  |
/// |----------------------|--------|
/// | `max_features`       | `Sqrt` |
/// | `max_depth`          | none   |
/// | `min_samples_split`  | 2      |
/// | `min_samples_leaf`   | 1      |
/// | `criterion`          | `Gini` |
/// | `seed`               | 42     |
/// | `bootstrap_fraction` | 1.0    |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) seed: u64,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) bootstrap_fraction: f64,
}

impl RandomForestConfig {
    /// Start from the defaults with `n_trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] for `n_trees == 0`.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            seed: 42,
            criterion: SplitCriterion::Gini,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap_fraction: 1.0,
        })
    }

    /// Seed of the master RNG that seeds every tree.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Impurity measure used to score splits.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Per-split feature subsampling.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Depth cap; `None` grows until leaves are pure or too small.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nodes with fewer samples become leaves.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Splits leaving fewer samples on either side are rejected.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Bootstrap draws per tree as a share of the training set size.
    #[must_use]
    pub fn with_bootstrap_fraction(mut self, bootstrap_fraction: f64) -> Self {
        self.bootstrap_fraction = bootstrap_fraction;
        self
    }

    /// Number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fit a forest on row-major `features` (`features[sample][column]`).
    ///
    /// Labels must lie in `0..n_classes`. Every class gets a probability
    /// slot, including classes absent from `labels`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf == 0` |
    /// | [`RfError::InvalidBootstrapFraction`] | fraction outside (0.0, 1.0] |
    /// | [`RfError::InvalidClassCount`] | `n_classes == 0` |
    /// | [`RfError::EmptyDataset`] | no rows |
    /// | [`RfError::ZeroFeatures`] | rows have no columns |
    /// | [`RfError::LabelCountMismatch`] | one label per row is not given |
    /// | [`RfError::FeatureCountMismatch`] | ragged rows |
    /// | [`RfError::NonFiniteValue`] | NaN or infinity in the matrix |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` resolves outside `1..=n_features` |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        feature_names: &[String],
    ) -> Result<RandomForestResult, RfError> {
        crate::forest::train(self, features, labels, n_classes, feature_names)
    }

    /// Check the growth settings that `new` does not cover.
    pub(crate) fn validate(&self) -> Result<(), RfError> {
        match self {
            Self {
                max_depth: Some(0), ..
            } => Err(RfError::InvalidMaxDepth { max_depth: 0 }),
            Self {
                min_samples_split: m,
                ..
            } if *m < 2 => Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: *m,
            }),
            Self {
                min_samples_leaf: 0, ..
            } => Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: 0,
            }),
            Self {
                bootstrap_fraction: f,
                ..
            } if !(*f > 0.0 && *f <= 1.0) => {
                Err(RfError::InvalidBootstrapFraction { fraction: *f })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(6).unwrap(), 2);
        assert_eq!(MaxFeatures::Log2.resolve(6).unwrap(), 2);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(6).unwrap(), 3);
        assert_eq!(MaxFeatures::All.resolve(6).unwrap(), 6);
        assert_eq!(MaxFeatures::Sqrt.resolve(1).unwrap(), 1);
    }

    #[test]
    fn fixed_count_beyond_columns_rejected() {
        assert!(matches!(
            MaxFeatures::Fixed(7).resolve(6),
            Err(RfError::InvalidMaxFeatures {
                max_features: 7,
                n_features: 6
            })
        ));
        assert!(MaxFeatures::Fixed(0).resolve(6).is_err());
    }

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            RandomForestConfig::new(0),
            Err(RfError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn growth_settings_validated() {
        let base = RandomForestConfig::new(3).unwrap();
        assert!(base.validate().is_ok());
        assert!(matches!(
            base.clone().with_max_depth(Some(0)).validate(),
            Err(RfError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            base.clone().with_min_samples_split(1).validate(),
            Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: 1
            })
        ));
        assert!(matches!(
            base.clone().with_min_samples_leaf(0).validate(),
            Err(RfError::InvalidMinSamplesLeaf { .. })
        ));
        assert!(matches!(
            base.clone().with_bootstrap_fraction(0.0).validate(),
            Err(RfError::InvalidBootstrapFraction { .. })
        ));
        assert!(matches!(
            base.with_bootstrap_fraction(f64::NAN).validate(),
            Err(RfError::InvalidBootstrapFraction { .. })
        ));
    }
}
