//! The pluggable classifier seam and its random forest implementation.

use tracing::instrument;

use triage_features::{FEATURE_NAMES, N_FEATURES};
use triage_rf::{RandomForest, RandomForestConfig, RandomForestResult};

use crate::error::ModelError;
use crate::evaluate::FeatureImportance;

/// Trains a [`Predictor`] from a feature matrix and class labels.
pub trait Classifier {
    /// The fitted model.
    type Model: Predictor;

    /// Fit on `features[sample][feature]` with labels in `0..n_classes`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the implementation rejects the input.
    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self::Model, ModelError>;
}

/// A fitted multi-class model.
pub trait Predictor {
    /// Predict one label per row, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when a row does not match the training shape.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ModelError>;

    /// Ranked feature importances, if the model exposes them.
    fn feature_importances(&self) -> Vec<FeatureImportance> {
        Vec::new()
    }
}

/// Column names for a matrix of `n_features` columns.
fn feature_names(n_features: usize) -> Vec<String> {
    if n_features == N_FEATURES {
        FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    } else {
        (0..n_features).map(|i| format!("f{i}")).collect()
    }
}

impl Classifier for RandomForestConfig {
    type Model = RandomForestResult;

    #[instrument(skip_all, fields(n_trees = self.n_trees(), seed = self.seed()))]
    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self::Model, ModelError> {
        let n_features = features.first().map_or(0, Vec::len);
        Ok(RandomForestConfig::fit(
            self,
            features,
            labels,
            n_classes,
            &feature_names(n_features),
        )?)
    }
}

impl Predictor for RandomForest {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        Ok(self.predict_batch(features)?)
    }
}

impl Predictor for RandomForestResult {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        Predictor::predict(self.forest(), features)
    }

    fn feature_importances(&self) -> Vec<FeatureImportance> {
        self.importances()
            .iter()
            .map(|f| FeatureImportance {
                name: f.name.clone(),
                importance: f.importance,
                rank: f.rank,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_columns_use_feature_names() {
        assert_eq!(feature_names(6)[1], "mean_intensity");
        assert_eq!(feature_names(2), vec!["f0", "f1"]);
    }

    #[test]
    fn forest_through_the_seam() {
        let x = vec![vec![0.0], vec![0.5], vec![5.0], vec![5.5]];
        let y = vec![0, 0, 2, 2];
        let config = RandomForestConfig::new(10).unwrap();
        let model = Classifier::fit(&config, &x, &y, 3).unwrap();
        assert_eq!(Predictor::predict(&model, &x).unwrap(), y);
        assert_eq!(model.feature_importances()[0].name, "f0");
    }

    #[test]
    fn rf_errors_are_wrapped() {
        let config = RandomForestConfig::new(2).unwrap();
        let err = Classifier::fit(&config, &[], &[], 3).unwrap_err();
        assert!(matches!(err, ModelError::Classifier(triage_rf::RfError::EmptyDataset)));
    }
}
