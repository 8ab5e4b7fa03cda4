//! Seeded, label-stratified train/validation/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ModelError;

/// Configuration for the two-step stratified split.
///
/// The first step holds out `holdout_fraction` of the samples; the second
/// sends `test_share` of the holdout to test and the rest to validation.
///
/// # Defaults
///
/// | Parameter          | Default |
/// |--------------------|---------|
/// | `holdout_fraction` | 0.3     |
/// | `test_share`       | 0.5     |
/// | `seed`             | 42      |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    holdout_fraction: f64,
    test_share: f64,
    seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.3,
            test_share: 0.5,
            seed: 42,
        }
    }
}

/// Disjoint sample indices (into the dataset) per partition, each ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partitions {
    /// Training indices.
    pub train: Vec<usize>,
    /// Validation indices.
    pub validation: Vec<usize>,
    /// Test indices.
    pub test: Vec<usize>,
}

impl Partitions {
    /// Total number of indices across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// Return `true` if every partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SplitConfig {
    /// Create a config with default fractions and the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Set the fraction of samples held out from training.
    #[must_use]
    pub fn with_holdout_fraction(mut self, holdout_fraction: f64) -> Self {
        self.holdout_fraction = holdout_fraction;
        self
    }

    /// Set the share of the holdout assigned to test.
    #[must_use]
    pub fn with_test_share(mut self, test_share: f64) -> Self {
        self.test_share = test_share;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition sample positions by their class `labels`.
    ///
    /// Each class is spread over the partitions in proportion to its size.
    /// The same labels and seed always give the same membership.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::InvalidFraction`] | A fraction is not in (0.0, 1.0) |
    /// | [`ModelError::EmptyPartition`] | Too few samples to fill every partition |
    #[instrument(skip_all, fields(n_samples = labels.len(), seed = self.seed))]
    pub fn split(&self, labels: &[usize]) -> Result<Partitions, ModelError> {
        check_fraction("holdout_fraction", self.holdout_fraction)?;
        check_fraction("test_share", self.test_share)?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let all: Vec<usize> = (0..labels.len()).collect();
        let (train, holdout) =
            stratified_split(&all, labels, self.holdout_fraction, &mut rng, "train", "holdout")?;
        let (validation, test) =
            stratified_split(&holdout, labels, self.test_share, &mut rng, "validation", "test")?;

        info!(
            train = train.len(),
            validation = validation.len(),
            test = test.len(),
            "stratified split complete"
        );
        Ok(Partitions {
            train,
            validation,
            test,
        })
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ModelError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidFraction { name, value })
    }
}

/// Split `positions` into (kept, held out), holding out
/// `ceil(fraction * n)` samples spread across classes.
///
/// Per-class held-out counts are the floors of the proportional shares,
/// with the leftover handed to the largest fractional parts (lower class
/// first on ties).
fn stratified_split(
    positions: &[usize],
    labels: &[usize],
    fraction: f64,
    rng: &mut ChaCha8Rng,
    kept_name: &'static str,
    held_name: &'static str,
) -> Result<(Vec<usize>, Vec<usize>), ModelError> {
    let n = positions.len();
    let n_held = (fraction * n as f64).ceil() as usize;
    let n_kept = n.saturating_sub(n_held);
    if n_held == 0 {
        return Err(ModelError::EmptyPartition {
            partition: held_name,
            n_samples: n,
        });
    }
    if n_kept == 0 {
        return Err(ModelError::EmptyPartition {
            partition: kept_name,
            n_samples: n,
        });
    }

    let n_classes = positions.iter().map(|&p| labels[p] + 1).max().unwrap_or(0);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for &p in positions {
        by_class[labels[p]].push(p);
    }

    let quotas = allocate(&by_class.iter().map(Vec::len).collect::<Vec<_>>(), n_held, n);

    let mut kept = Vec::with_capacity(n_kept);
    let mut held = Vec::with_capacity(n_held);
    for (mut members, quota) in by_class.into_iter().zip(quotas) {
        members.shuffle(rng);
        held.extend_from_slice(&members[..quota]);
        kept.extend_from_slice(&members[quota..]);
    }
    kept.sort_unstable();
    held.sort_unstable();
    Ok((kept, held))
}

/// Largest-remainder allocation of `n_draw` out of `total` across classes.
fn allocate(class_counts: &[usize], n_draw: usize, total: usize) -> Vec<usize> {
    let shares: Vec<f64> = class_counts
        .iter()
        .map(|&c| c as f64 * n_draw as f64 / total as f64)
        .collect();
    let mut quotas: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
    let mut leftover = n_draw - quotas.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = shares[a] - shares[a].floor();
        let rb = shares[b] - shares[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for class in order {
        if leftover == 0 {
            break;
        }
        if quotas[class] < class_counts[class] {
            quotas[class] += 1;
            leftover -= 1;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[usize]) -> Vec<usize> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(class, &n)| std::iter::repeat_n(class, n))
            .collect()
    }

    #[test]
    fn sizes_follow_fractions() {
        let y = labels(&[10, 10]);
        let p = SplitConfig::default().split(&y).unwrap();
        assert_eq!(p.test.len() + p.validation.len(), 6);
        assert_eq!(p.train.len(), 14);
        assert_eq!(p.test.len(), 3);
        assert_eq!(p.validation.len(), 3);
    }

    #[test]
    fn partitions_are_disjoint_and_cover() {
        let y = labels(&[7, 5, 9]);
        let p = SplitConfig::default().split(&y).unwrap();
        let mut all: Vec<usize> = p
            .train
            .iter()
            .chain(&p.validation)
            .chain(&p.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
        assert_eq!(p.len(), y.len());
    }

    #[test]
    fn stratification_keeps_class_proportions() {
        let y = labels(&[40, 20, 40]);
        let p = SplitConfig::default().split(&y).unwrap();
        let count = |idx: &[usize], class| idx.iter().filter(|&&i| y[i] == class).count();
        assert_eq!(count(&p.train, 0), 28);
        assert_eq!(count(&p.train, 1), 14);
        assert_eq!(count(&p.train, 2), 28);
        assert_eq!(count(&p.test, 1), 3);
    }

    #[test]
    fn same_seed_same_membership() {
        let y = labels(&[12, 8, 10]);
        let a = SplitConfig::new(42).split(&y).unwrap();
        let b = SplitConfig::new(42).split(&y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_changes_membership() {
        let y = labels(&[30, 30]);
        let a = SplitConfig::new(1).split(&y).unwrap();
        let b = SplitConfig::new(2).split(&y).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_fraction() {
        let err = SplitConfig::default()
            .with_holdout_fraction(1.0)
            .split(&labels(&[5, 5]))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidFraction {
                name: "holdout_fraction",
                ..
            }
        ));
    }

    #[test]
    fn too_few_samples_is_an_error() {
        // 3 samples: 1 held out, then the single holdout sample cannot fill both halves.
        let err = SplitConfig::default().split(&labels(&[2, 1])).unwrap_err();
        assert!(matches!(
            err,
            ModelError::EmptyPartition {
                partition: "validation",
                n_samples: 1
            }
        ));
    }

    #[test]
    fn allocation_hands_leftover_to_largest_remainder() {
        // shares: 2.4, 1.2, 2.4 -> floors 2,1,2 (5), one leftover to class 0.
        assert_eq!(allocate(&[4, 2, 4], 6, 10), vec![3, 1, 2]);
    }
}
