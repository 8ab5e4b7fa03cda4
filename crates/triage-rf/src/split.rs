use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let proportions = class_counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// The chosen split for a node, with the partitioned sample indices.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) impurity_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Inputs shared by every split search within one tree.
pub(crate) struct SplitContext<'a> {
    /// Column-major features: `columns[feature][sample]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitContext<'_> {
    /// Find the best threshold split over a random subset of features.
    ///
    /// Features are visited in random order. Constant features (within
    /// `samples`) do not count toward `max_features`, so the search keeps
    /// drawing until `max_features` informative features have been scanned
    /// or none remain.
    ///
    /// `samples` may contain repeats (bootstrap draws); each repeat counts
    /// as a separate observation.
    ///
    /// Returns `None` when no split satisfies `min_samples_leaf`.
    pub(crate) fn find_best_split(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        parent_impurity: Impurity,
        rng: &mut impl Rng,
    ) -> Option<SplitResult> {
        let n_features = self.columns.len();
        let n = samples.len();
        if n < 2 || n_features == 0 {
            return None;
        }

        let mut order: Vec<usize> = (0..n_features).collect();
        let mut best: Option<(usize, f64, f64)> = None;
        let mut informative_seen = 0usize;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for drawn in 0..n_features {
            if informative_seen >= self.max_features {
                break;
            }
            let pick = rng.gen_range(drawn..n_features);
            order.swap(drawn, pick);
            let feature = order[drawn];
            let column = &self.columns[feature];

            sorted.clear();
            sorted.extend(samples.iter().map(|&s| (column[s], self.labels[s])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            if sorted[0].0 == sorted[n - 1].0 {
                continue;
            }
            informative_seen += 1;

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();
            for i in 0..n - 1 {
                let (value, label) = sorted[i];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                let next = sorted[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = n as f64 * parent_impurity.value()
                    - n_left as f64 * self.criterion.impurity(&left_counts, n_left).value()
                    - n_right as f64 * self.criterion.impurity(&right_counts, n_right).value();
                if best.is_none_or(|(_, _, d)| decrease > d) {
                    best = Some((feature, threshold_between(value, next), decrease));
                }
            }
        }

        let (feature, threshold, impurity_decrease) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&s| column[s] <= threshold);
        if left.is_empty() || right.is_empty() {
            return None;
        }

        Some(SplitResult {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease,
            left,
            right,
        })
    }
}

/// Midpoint of two distinct sorted values, kept strictly below `upper`.
///
/// For adjacent floats the midpoint can round up to `upper`, which would
/// send every row left; fall back to `lower` then.
fn threshold_between(lower: f64, upper: f64) -> f64 {
    let mid = lower / 2.0 + upper / 2.0;
    if mid >= upper || mid < lower { lower } else { mid }
}
