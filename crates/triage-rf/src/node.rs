use std::fmt;

/// Column of the training matrix a split tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Position of a node in its tree's arena; the root is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Node impurity under a [`SplitCriterion`](crate::SplitCriterion); 0 means pure.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Split {
        feature: FeatureIndex,
        /// Rows with `value <= threshold` descend left.
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        /// `n * I(node) - n_left * I(left) - n_right * I(right)`, for importances.
        impurity_decrease: f64,
    },
    Leaf {
        /// Share of each class among the bootstrap rows reaching the leaf.
        distribution: Vec<f64>,
    },
}

impl Node {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impurity_prints_six_decimals() {
        assert_eq!(Impurity::new(1.0 / 3.0).to_string(), "0.333333");
        assert!(Impurity::new(0.1) < Impurity::new(0.2));
    }

    #[test]
    fn leaf_and_split_are_distinguished() {
        let leaf = Node::Leaf {
            distribution: vec![0.25, 0.75],
        };
        let split = Node::Split {
            feature: FeatureIndex::new(0),
            threshold: 0.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity_decrease: 1.0,
        };
        assert!(leaf.is_leaf());
        assert!(!split.is_leaf());
    }
}
