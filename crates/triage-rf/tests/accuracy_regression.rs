//! Accuracy regression tests for triage-rf.
//!
//! Guards against algorithmic changes that degrade forest accuracy on a
//! deterministic synthetic six-feature, three-class dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use triage_rf::{ConfusionMatrix, MaxFeatures, RandomForestConfig, SplitCriterion};

/// Six columns shaped like lesion features: the first two carry the class
/// signal, the rest are noise or scale-only columns.
fn make_lesions(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 3;
        let area = 200.0 + class as f64 * 400.0 + rng.r#gen::<f64>() * 150.0;
        let mean = 60.0 + class as f64 * 40.0 + rng.r#gen::<f64>() * 20.0;
        let std = rng.r#gen::<f64>() * 10.0;
        features.push(vec![area, mean, std, 64.0, 64.0, 4096.0]);
        labels.push(class);
    }
    let names = ["area", "mean_intensity", "std_intensity", "height", "width", "total_pixels"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    (features, labels, names)
}

fn holdout_accuracy(config: &RandomForestConfig) -> f64 {
    let (train_x, train_y, names) = make_lesions(240, 42);
    let (test_x, test_y, _) = make_lesions(90, 7);
    let result = config.fit(&train_x, &train_y, 3, &names).unwrap();
    let predicted = result.forest().predict_batch(&test_x).unwrap();
    ConfusionMatrix::from_labels(&test_y, &predicted, 3)
        .unwrap()
        .accuracy()
}

/// Reference: default 100-tree forest separates the synthetic classes cleanly.
#[test]
fn holdout_accuracy_above_threshold() {
    let accuracy = holdout_accuracy(&RandomForestConfig::new(100).unwrap());
    assert!(accuracy > 0.9, "holdout accuracy {accuracy} <= 0.9");
}

#[test]
fn entropy_holdout_accuracy_above_threshold() {
    let config = RandomForestConfig::new(50)
        .unwrap()
        .with_criterion(SplitCriterion::Entropy)
        .with_max_features(MaxFeatures::All);
    let accuracy = holdout_accuracy(&config);
    assert!(accuracy > 0.9, "entropy holdout accuracy {accuracy} <= 0.9");
}

#[test]
fn depth_limit_is_respected() {
    let (x, y, names) = make_lesions(150, 42);
    let result = RandomForestConfig::new(20)
        .unwrap()
        .with_max_depth(Some(2))
        .fit(&x, &y, 3, &names)
        .unwrap();
    assert!(result.stats().mean_depth <= 2.0);
}

#[test]
fn informative_features_rank_first() {
    let (x, y, names) = make_lesions(240, 42);
    let result = RandomForestConfig::new(100).unwrap().fit(&x, &y, 3, &names).unwrap();
    let top_two: Vec<&str> = result.importances()[..2]
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert!(top_two.contains(&"area"), "top features {top_two:?}");
    assert!(top_two.contains(&"mean_intensity"), "top features {top_two:?}");
    // Constant columns never split.
    for f in result.importances() {
        if matches!(f.name.as_str(), "height" | "width" | "total_pixels") {
            assert_eq!(f.importance, 0.0);
        }
    }
}

#[test]
fn identical_seeds_give_identical_predictions() {
    let (x, y, names) = make_lesions(120, 3);
    let fit = |seed| {
        RandomForestConfig::new(25)
            .unwrap()
            .with_seed(seed)
            .fit(&x, &y, 3, &names)
            .unwrap()
            .into_forest()
    };
    let (a, b) = (fit(42), fit(42));
    assert_eq!(a.predict_batch(&x).unwrap(), b.predict_batch(&x).unwrap());
}
