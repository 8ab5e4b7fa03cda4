use rand_chacha::ChaCha8Rng;

use crate::node::{Node, NodeIndex};
use crate::split::SplitContext;

/// Stopping rules for growing one tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthLimits {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
}

/// A fitted CART decision tree stored as a node arena.
#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl DecisionTree {
    /// Grow a tree on the given (possibly repeated) sample indices.
    ///
    /// Inputs are assumed validated by the forest.
    pub(crate) fn grow(
        ctx: &SplitContext<'_>,
        limits: GrowthLimits,
        samples: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_features: ctx.columns.len(),
        };
        tree.grow_node(ctx, limits, samples, 0, rng);
        tree
    }

    fn grow_node(
        &mut self,
        ctx: &SplitContext<'_>,
        limits: GrowthLimits,
        samples: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> NodeIndex {
        let n = samples.len();
        let mut counts = vec![0usize; ctx.n_classes];
        for &s in samples {
            counts[ctx.labels[s]] += 1;
        }
        let impurity = ctx.criterion.impurity(&counts, n);

        let at_depth_limit = limits.max_depth.is_some_and(|d| depth >= d);
        let stop = n < limits.min_samples_split || impurity.value() == 0.0 || at_depth_limit;
        let split = if stop {
            None
        } else {
            ctx.find_best_split(samples, &counts, impurity, rng)
        };

        let idx = NodeIndex::new(self.nodes.len());
        let Some(split) = split else {
            let total = n.max(1) as f64;
            self.nodes.push(Node::Leaf {
                distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            });
            return idx;
        };

        // Reserve the slot so children land after their parent.
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.grow_node(ctx, limits, &split.left, depth + 1, rng);
        let right = self.grow_node(ctx, limits, &split.right, depth + 1, rng);
        self.nodes[idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity_decrease: split.impurity_decrease,
        };
        idx
    }

    /// Class distribution of the leaf `sample` falls into.
    ///
    /// `sample` must have `n_features` values.
    pub(crate) fn leaf_distribution(&self, sample: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1
    /// (all zeros for a single-leaf tree).
    pub(crate) fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    pub(crate) fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest leaf; a lone root leaf has depth 0.
    pub(crate) fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

/// Grow a tree directly from row-major data, for unit tests.
#[cfg(test)]
pub(crate) fn grow_for_test(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    max_depth: Option<usize>,
    seed: u64,
) -> DecisionTree {
    use rand::SeedableRng;

    use crate::split::SplitCriterion;

    let columns: Vec<Vec<f64>> = (0..features[0].len())
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect();
    let ctx = SplitContext {
        columns: &columns,
        labels,
        n_classes,
        criterion: SplitCriterion::Gini,
        max_features: columns.len(),
        min_samples_leaf: 1,
    };
    let limits = GrowthLimits {
        max_depth,
        min_samples_split: 2,
    };
    let samples: Vec<usize> = (0..labels.len()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    DecisionTree::grow(&ctx, limits, &samples, &mut rng)
}
