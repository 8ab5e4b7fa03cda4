//! Inference on a fitted forest.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Class probabilities for one row, averaged over every tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution(Vec<f64>);

impl ClassDistribution {
    /// Most probable class; ties go to the lowest class index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0usize;
        for (class, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = class;
            }
        }
        best
    }

    /// One probability per class, in class order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl RandomForest {
    /// Class label for one row.
    ///
    /// # Errors
    ///
    /// [`RfError::PredictionFeatureMismatch`] if the row width differs from training.
    pub fn predict(&self, row: &[f64]) -> Result<usize, RfError> {
        self.predict_proba(row).map(|d| d.predicted_class())
    }

    /// Mean of the leaf distributions reached by `row` in each tree.
    ///
    /// # Errors
    ///
    /// [`RfError::PredictionFeatureMismatch`] if the row width differs from training.
    pub fn predict_proba(&self, row: &[f64]) -> Result<ClassDistribution, RfError> {
        if row.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let mut sums = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sums.iter_mut().zip(tree.leaf_distribution(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(ClassDistribution(sums.into_iter().map(|s| s / n_trees).collect()))
    }

    /// Labels for many rows, computed in parallel and returned in row order.
    ///
    /// # Errors
    ///
    /// [`RfError::PredictionFeatureMismatch`] on the first row of the wrong width.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        rows.into_par_iter().map(|row| self.predict(row)).collect()
    }

    /// Columns the forest was fit on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Declared class count.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Ensemble size.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Column names given at fit time.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomForestConfig;

    fn fit(rows: &[Vec<f64>], labels: &[usize], n_classes: usize, n_trees: usize) -> RandomForest {
        RandomForestConfig::new(n_trees)
            .unwrap()
            .fit(rows, labels, n_classes, &["f".to_string()])
            .unwrap()
            .into_forest()
    }

    #[test]
    fn ties_resolve_to_lowest_class() {
        assert_eq!(ClassDistribution(vec![0.4, 0.4, 0.2]).predicted_class(), 0);
        assert_eq!(ClassDistribution(vec![0.2, 0.4, 0.4]).predicted_class(), 1);
        assert_eq!(ClassDistribution(vec![0.1, 0.2, 0.7]).predicted_class(), 2);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let forest = fit(&[vec![0.0], vec![1.0], vec![2.0], vec![3.0]], &[0, 0, 1, 2], 3, 8);
        let total: f64 = forest.predict_proba(&[1.5]).unwrap().as_slice().iter().sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
    }

    #[test]
    fn wrong_width_rejected() {
        let forest = fit(&[vec![0.0], vec![1.0]], &[0, 1], 2, 2);
        assert!(matches!(
            forest.predict(&[0.0, 1.0]),
            Err(RfError::PredictionFeatureMismatch {
                expected: 1,
                got: 2
            })
        ));
    }

    #[test]
    fn batch_agrees_with_single_rows() {
        let rows = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0]];
        let forest = fit(&rows, &[0, 0, 1, 1], 2, 6);
        let batch = forest.predict_batch(&rows).unwrap();
        for (row, &label) in rows.iter().zip(&batch) {
            assert_eq!(forest.predict(row).unwrap(), label);
        }
        assert_eq!(forest.n_trees(), 6);
        assert_eq!(forest.n_classes(), 2);
        assert_eq!(forest.feature_names(), ["f"]);
    }
}
