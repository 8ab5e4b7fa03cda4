//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::{RankedFeature, aggregate_importances};
use crate::split::SplitContext;
use crate::tree::{DecisionTree, GrowthLimits};

/// A fitted ensemble of CART trees whose leaf distributions are averaged.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Shape of a fit: inputs seen and the size of the grown trees.
#[derive(Debug, Clone, PartialEq)]
pub struct FitStats {
    /// Trees grown.
    pub n_trees: usize,
    /// Training rows.
    pub n_samples: usize,
    /// Training columns.
    pub n_features: usize,
    /// Declared class count.
    pub n_classes: usize,
    /// Columns examined per split search.
    pub max_features_resolved: usize,
    /// Average depth over trees.
    pub mean_depth: f64,
    /// Average leaf count over trees.
    pub mean_leaves: f64,
}

/// What [`RandomForestConfig::fit`] returns.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    stats: FitStats,
}

impl RandomForestResult {
    /// The fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Drop the importances and stats, keeping the forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Impurity-based importances, most important first.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Fit statistics.
    #[must_use]
    pub fn stats(&self) -> &FitStats {
        &self.stats
    }
}

/// Draw `draw_count` sample indices with replacement.
fn bootstrap_indices(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Check shape, finiteness and label range; return the feature count.
fn validate_inputs(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<usize, RfError> {
    if n_classes == 0 {
        return Err(RfError::InvalidClassCount);
    }
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, (row, &label)) in features.iter().zip(labels).enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
        if label >= n_classes {
            return Err(RfError::LabelOutOfRange {
                sample_index,
                label,
                n_classes,
            });
        }
    }
    Ok(n_features)
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    config.validate()?;
    let n_features = validate_inputs(features, labels, n_classes)?;
    let max_features_resolved = config.max_features.resolve(n_features)?;

    let n_samples = features.len();
    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features = max_features_resolved,
        draw_count,
        "training random forest"
    );

    // Trees index into columns; bootstrap draws never copy rows.
    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect();
    let ctx = SplitContext {
        columns: &columns,
        labels,
        n_classes,
        criterion: config.criterion,
        max_features: max_features_resolved,
        min_samples_leaf: config.min_samples_leaf,
    };
    let limits = GrowthLimits {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
    };

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let samples = bootstrap_indices(n_samples, draw_count, &mut rng);
            DecisionTree::grow(&ctx, limits, &samples, &mut rng)
        })
        .collect();

    let per_tree_importances: Vec<Vec<f64>> =
        trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree_importances, feature_names);

    let n_trees = trees.len() as f64;
    let mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / n_trees;
    let mean_leaves = trees.iter().map(DecisionTree::n_leaves).sum::<usize>() as f64 / n_trees;
    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    let stats = FitStats {
        n_trees: config.n_trees,
        n_features,
        n_classes,
        n_samples,
        max_features_resolved,
        mean_depth,
        mean_leaves,
    };

    info!(
        mean_depth,
        mean_leaves,
        top_feature = importances.first().map(|f| f.name.as_str()),
        "random forest training complete"
    );

    Ok(RandomForestResult {
        forest,
        importances,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::error::RfError;
    use crate::split::SplitCriterion;

    /// Three well separated classes along `x`; `y` is noise-free filler.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (class, offset) in [(0usize, 0.0), (1, 10.0), (2, 20.0)] {
            for i in 0..20 {
                features.push(vec![offset + i as f64 * 0.15, 0.5]);
                labels.push(class);
            }
        }
        (features, labels, vec!["x".to_string(), "y".to_string()])
    }

    fn train_accuracy(config: &RandomForestConfig) -> f64 {
        let (features, labels, names) = make_separable_data();
        let result = config.fit(&features, &labels, 3, &names).unwrap();
        let predictions = result.forest().predict_batch(&features).unwrap();
        let correct = predictions.iter().zip(&labels).filter(|(p, l)| p == l).count();
        correct as f64 / labels.len() as f64
    }

    #[test]
    fn three_class_separable_accuracy() {
        let config = RandomForestConfig::new(50)
            .unwrap()
            .with_max_features(MaxFeatures::All);
        let accuracy = train_accuracy(&config);
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn entropy_criterion_also_learns() {
        let config = RandomForestConfig::new(30)
            .unwrap()
            .with_criterion(SplitCriterion::Entropy);
        let accuracy = train_accuracy(&config);
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn feature_importances_sum_to_one() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(20)
            .unwrap()
            .fit(&features, &labels, 3, &names)
            .unwrap();
        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].name, "x");
        assert_eq!(result.importances()[0].rank, 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels, names) = make_separable_data();
        let fit = || {
            RandomForestConfig::new(10)
                .unwrap()
                .with_seed(99)
                .fit(&features, &labels, 3, &names)
                .unwrap()
        };
        let (a, b) = (fit(), fit());
        for sample in &features {
            assert_eq!(
                a.forest().predict_proba(sample).unwrap().as_slice(),
                b.forest().predict_proba(sample).unwrap().as_slice()
            );
        }
    }

    #[test]
    fn absent_class_keeps_probability_slot() {
        let features = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0]];
        let labels = vec![0, 0, 2, 2];
        let result = RandomForestConfig::new(5)
            .unwrap()
            .fit(&features, &labels, 3, &["f".to_string()])
            .unwrap();
        let proba = result.forest().predict_proba(&[0.5]).unwrap();
        assert_eq!(proba.as_slice().len(), 3);
        assert_eq!(proba.as_slice()[1], 0.0);
        assert_eq!(result.stats().n_classes, 3);
    }

    #[test]
    fn empty_dataset_error() {
        let err = RandomForestConfig::new(10)
            .unwrap()
            .fit(&[], &[], 3, &[])
            .unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn label_out_of_range_error() {
        let err = RandomForestConfig::new(2)
            .unwrap()
            .fit(&[vec![1.0], vec![2.0]], &[0, 3], 3, &["f".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelOutOfRange {
                sample_index: 1,
                label: 3,
                n_classes: 3
            }
        ));
    }

    #[test]
    fn non_finite_value_error() {
        let err = RandomForestConfig::new(2)
            .unwrap()
            .fit(
                &[vec![1.0, 2.0], vec![f64::NAN, 0.0]],
                &[0, 1],
                2,
                &["a".to_string(), "b".to_string()],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                sample_index: 1,
                feature_index: 0
            }
        ));
    }

    #[test]
    fn adjacent_float_values_train_and_separate() {
        let a = f64::from_bits(1.0f64.to_bits() + 1);
        let b = f64::from_bits(a.to_bits() + 1);
        let features = vec![vec![a], vec![b], vec![a], vec![b]];
        let result = RandomForestConfig::new(20)
            .unwrap()
            .fit(&features, &[0, 1, 0, 1], 2, &["f".to_string()])
            .unwrap();
        assert_eq!(result.forest().predict(&[a]).unwrap(), 0);
        assert_eq!(result.forest().predict(&[b]).unwrap(), 1);
    }

    #[test]
    fn label_count_mismatch_error() {
        let err = RandomForestConfig::new(2)
            .unwrap()
            .fit(&[vec![1.0], vec![2.0]], &[0], 2, &["f".to_string()])
            .unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));
    }
}
